use crate::connection::auth::Privilege;
use crate::core::{DbError, DeploymentContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feature flags gating command registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureFlags {
    #[serde(default = "enabled")]
    pub analyze_shard_key: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            analyze_shard_key: true,
        }
    }
}

/// Runtime parameters; their values can later be changed with `setParameter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AnalysisParameters {
    #[serde(rename = "analyzeShardKeySkipKeyCharacteristics", default)]
    pub skip_key_characteristics: bool,
    #[serde(rename = "analyzeShardKeySkipReadWriteDistribution", default)]
    pub skip_read_write_distribution: bool,
}

/// Extra account created at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub privileges: Vec<Privilege>,
}

/// Server configuration
///
/// Built in code or loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Administrator username
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Administrator password
    pub admin_password: String,

    /// bcrypt cost factor for stored password hashes
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,

    /// Facts about this node's topology
    #[serde(default)]
    pub deployment: DeploymentContext,

    #[serde(default)]
    pub feature_flags: FeatureFlags,

    /// Initial values of the runtime parameters
    #[serde(default)]
    pub parameters: AnalysisParameters,

    #[serde(default)]
    pub users: Vec<UserConfig>,
}

fn enabled() -> bool {
    true
}

fn default_bind_addr() -> String {
    "127.0.0.1:27080".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ServerConfig {
    /// Create a configuration for a replica set member with the given admin password
    pub fn new(admin_password: &str) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            admin_username: default_admin_username(),
            admin_password: admin_password.to_string(),
            password_hash_cost: default_hash_cost(),
            deployment: DeploymentContext::default(),
            feature_flags: FeatureFlags::default(),
            parameters: AnalysisParameters::default(),
            users: Vec::new(),
        }
    }

    /// Set the listen address
    pub fn bind_addr(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Set the administrator username
    pub fn admin_username(mut self, username: &str) -> Self {
        self.admin_username = username.to_string();
        self
    }

    /// Set the bcrypt cost factor
    pub fn password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }

    /// Set the deployment facts
    pub fn deployment(mut self, deployment: DeploymentContext) -> Self {
        self.deployment = deployment;
        self
    }

    /// Enable or disable the analyzeShardKey feature flag
    pub fn analyze_shard_key_enabled(mut self, enabled: bool) -> Self {
        self.feature_flags.analyze_shard_key = enabled;
        self
    }

    /// Set the initial runtime parameters
    pub fn parameters(mut self, parameters: AnalysisParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Add an account to create at startup
    pub fn user(mut self, username: &str, password: &str, privileges: Vec<Privilege>) -> Self {
        self.users.push(UserConfig {
            username: username.to_string(),
            password: password.to_string(),
            privileges,
        });
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if !(4..=31).contains(&self.password_hash_cost) {
            return Err(DbError::BadValue(format!(
                "passwordHashCost must be between 4 and 31, got {}",
                self.password_hash_cost
            )));
        }
        if self.admin_username.is_empty() {
            return Err(DbError::BadValue("adminUsername cannot be empty".into()));
        }
        Ok(())
    }
}
