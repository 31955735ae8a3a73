use serde::{Deserialize, Serialize};

/// Role this node plays in a sharded cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ClusterRole {
    /// Plain replica set member, not part of a sharded cluster.
    #[default]
    None,
    ShardServer,
    ConfigServer,
    /// Config server that also holds user data.
    ConfigServerAndShard,
}

/// Read-only facts about the current process, captured once and passed into
/// every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeploymentContext {
    pub replication_enabled: bool,
    #[serde(default)]
    pub cluster_role: ClusterRole,
    #[serde(default)]
    pub multitenancy_support: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
}

impl DeploymentContext {
    /// Replica set member without a sharding role.
    pub fn replica_set() -> Self {
        Self {
            replication_enabled: true,
            cluster_role: ClusterRole::None,
            multitenancy_support: false,
            maintenance_mode: false,
        }
    }

    pub fn standalone() -> Self {
        Self {
            replication_enabled: false,
            ..Self::replica_set()
        }
    }

    pub fn cluster_role(mut self, role: ClusterRole) -> Self {
        self.cluster_role = role;
        self
    }

    pub fn multitenancy(mut self, enabled: bool) -> Self {
        self.multitenancy_support = enabled;
        self
    }

    pub fn maintenance_mode(mut self, enabled: bool) -> Self {
        self.maintenance_mode = enabled;
        self
    }

    pub fn exclusively_has_config_role(&self) -> bool {
        self.cluster_role == ClusterRole::ConfigServer
    }
}

impl Default for DeploymentContext {
    fn default() -> Self {
        Self::replica_set()
    }
}
