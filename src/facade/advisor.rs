use crate::analysis::{
    AnalysisToggles, AnalyzeShardKeyResponse, CatalogValidator, KeyCharacteristicsAnalyzer,
    ReadWriteDistributionAnalyzer, ShardKeyAnalysisOrchestrator,
};
use crate::command::analyze_shard_key::NAME as ANALYZE_SHARD_KEY;
use crate::command::{CommandRegistry, reply};
use crate::connection::Interrupter;
use crate::connection::auth::{AuthManager, User};
use crate::connection::config::ServerConfig;
use crate::core::{DbError, DeploymentContext, Namespace, Result, ShardKeyPattern};
use crate::storage::CatalogHandle;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// One node's command endpoint: authentication, the command registry and the
/// shard key analysis wired behind it.
pub struct ShardKeyAdvisor {
    config: ServerConfig,
    auth: Arc<AuthManager>,
    catalog: CatalogHandle,
    toggles: Arc<AnalysisToggles>,
    registry: CommandRegistry,
}

impl ShardKeyAdvisor {
    pub async fn new(
        config: ServerConfig,
        catalog: CatalogHandle,
        key_characteristics: Arc<dyn KeyCharacteristicsAnalyzer>,
        read_write_distribution: Arc<dyn ReadWriteDistributionAnalyzer>,
    ) -> Result<Self> {
        let auth = Arc::new(AuthManager::with_admin_and_cost(
            &config.admin_username,
            &config.admin_password,
            config.password_hash_cost,
        )?);
        for user in &config.users {
            auth.create_user(&user.username, &user.password, user.privileges.clone())
                .await?;
        }

        let toggles = Arc::new(AnalysisToggles::new(&config.parameters));
        let orchestrator = Arc::new(ShardKeyAnalysisOrchestrator::new(
            Arc::new(CatalogValidator::new(catalog.clone())),
            key_characteristics,
            read_write_distribution,
            toggles.clone(),
        ));
        let registry = CommandRegistry::with_default_commands(&config.feature_flags, orchestrator);

        info!(
            commands = ?registry.list_commands(),
            replication_enabled = config.deployment.replication_enabled,
            cluster_role = ?config.deployment.cluster_role,
            multitenancy = config.deployment.multitenancy_support,
            "Shard key advisor ready"
        );

        Ok(Self {
            config,
            auth,
            catalog,
            toggles,
            registry,
        })
    }

    pub fn auth_manager(&self) -> &Arc<AuthManager> {
        &self.auth
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn toggles(&self) -> &Arc<AnalysisToggles> {
        &self.toggles
    }

    pub fn deployment(&self) -> &DeploymentContext {
        &self.config.deployment
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Authenticates, dispatches and frames the reply.
    pub async fn run_command(&self, username: &str, password: &str, db: &str, document: &Value) -> Value {
        match self.auth.authenticate(username, password).await {
            Ok(user) => self.run_command_as(user, db, document, Interrupter::new()).await,
            Err(err) => reply::error_reply(&err),
        }
    }

    /// Dispatches on behalf of an already authenticated user.
    pub async fn run_command_as(&self, user: User, db: &str, document: &Value, interrupter: Interrupter) -> Value {
        let result = self
            .registry
            .dispatch(user, interrupter, db, document, &self.config.deployment)
            .await;
        reply::into_reply(result)
    }

    /// Typed form of `{analyzeShardKey: <nss>, key: <key>}` run against `admin`.
    pub async fn analyze_shard_key(
        &self,
        user: User,
        nss: &Namespace,
        key: &ShardKeyPattern,
    ) -> Result<AnalyzeShardKeyResponse> {
        let mut document = Map::new();
        document.insert(ANALYZE_SHARD_KEY.to_string(), Value::String(nss.to_string()));
        document.insert("key".to_string(), key.to_json());

        let fields = self
            .registry
            .dispatch(user, Interrupter::new(), "admin", &Value::Object(document), &self.config.deployment)
            .await?;

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| DbError::InternalError(format!("malformed {ANALYZE_SHARD_KEY} reply: {e}")))
    }
}
