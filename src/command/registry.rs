use super::{AnalyzeShardKeyCommand, Command, CommandContext, SetParameterCommand};
use crate::analysis::ShardKeyAnalysisOrchestrator;
use crate::connection::auth::User;
use crate::connection::config::FeatureFlags;
use crate::connection::{Interrupter, OperationContext};
use crate::core::{DbError, DeploymentContext, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Dispatches command documents to registered commands by name.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Registers the built-in commands whose feature flags are on.
    pub fn with_default_commands(
        flags: &FeatureFlags,
        orchestrator: Arc<ShardKeyAnalysisOrchestrator>,
    ) -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(SetParameterCommand::new(orchestrator.toggles().clone())));
        if flags.analyze_shard_key {
            registry.register(Arc::new(AnalyzeShardKeyCommand::new(orchestrator)));
        }

        registry
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.iter().find(|c| c.name() == name)
    }

    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Runs `document` against database `db` on behalf of `user`.
    pub async fn dispatch(
        &self,
        user: User,
        interrupter: Interrupter,
        db: &str,
        document: &Value,
        deployment: &DeploymentContext,
    ) -> Result<Map<String, Value>> {
        let body = document
            .as_object()
            .filter(|body| !body.is_empty())
            .ok_or_else(|| DbError::FailedToParse("command document must be a non-empty object".into()))?;

        // The first field names the command.
        let name = body.keys().next().map(String::as_str).unwrap_or_default();
        let command = self
            .find(name)
            .ok_or_else(|| DbError::CommandNotFound(format!("no such command: '{name}'")))?;

        if command.admin_only() && db != "admin" {
            return Err(DbError::Unauthorized(format!(
                "{name} may only be run against the admin database."
            )));
        }
        if !command.maintenance_ok() && deployment.maintenance_mode {
            return Err(DbError::NotPrimaryOrSecondary("node is recovering".into()));
        }
        if !command.supports_write_concern() && body.contains_key("writeConcern") {
            return Err(DbError::InvalidOptions("Command does not support writeConcern".into()));
        }

        let mut op = OperationContext::new(user, interrupter);
        if let Some(limit) = parse_max_time_ms(body)? {
            op = op.with_time_limit(limit);
        }

        let ctx = CommandContext {
            op: &op,
            db,
            deployment,
        };
        let result = command.run(&ctx, body).await;
        if let Err(err) = &result {
            debug!(
                command = name,
                op_id = op.id(),
                code = err.code(),
                error = %err,
                "Command failed"
            );
        }
        result
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `maxTimeMS: 0` (or absent) means no limit.
fn parse_max_time_ms(body: &Map<String, Value>) -> Result<Option<Duration>> {
    let Some(raw) = body.get("maxTimeMS") else {
        return Ok(None);
    };

    let millis = raw
        .as_u64()
        .or_else(|| raw.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
        .ok_or_else(|| DbError::BadValue(format!("maxTimeMS must be a non-negative integer, got {raw}")))?;

    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}
