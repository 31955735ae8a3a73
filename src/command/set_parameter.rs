use super::{Command, CommandContext, is_generic_argument};
use crate::analysis::AnalysisToggles;
use crate::connection::auth::{ActionType, ResourcePattern};
use crate::core::{DbError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;

pub const NAME: &str = "setParameter";
pub const SKIP_KEY_CHARACTERISTICS: &str = "analyzeShardKeySkipKeyCharacteristics";
pub const SKIP_READ_WRITE_DISTRIBUTION: &str = "analyzeShardKeySkipReadWriteDistribution";

/// Flips the analysis toggles at runtime.
///
/// `{setParameter: 1, analyzeShardKeySkipKeyCharacteristics: true}` replies
/// with the previous values under `was`.
pub struct SetParameterCommand {
    toggles: Arc<AnalysisToggles>,
}

impl SetParameterCommand {
    pub fn new(toggles: Arc<AnalysisToggles>) -> Self {
        Self { toggles }
    }
}

#[async_trait]
impl Command for SetParameterCommand {
    fn name(&self) -> &'static str {
        NAME
    }

    fn help(&self) -> &'static str {
        "Sets a runtime server parameter."
    }

    fn admin_only(&self) -> bool {
        true
    }

    async fn run(&self, ctx: &CommandContext<'_>, body: &Map<String, Value>) -> Result<Map<String, Value>> {
        if !ctx
            .op
            .user()
            .is_authorized_for_actions_on_resource(&ResourcePattern::Cluster, &[ActionType::SetParameter])
        {
            return Err(DbError::Unauthorized("Unauthorized".into()));
        }

        let mut updates = Vec::new();
        for (field, value) in body {
            if field == NAME || is_generic_argument(field) {
                continue;
            }
            if field != SKIP_KEY_CHARACTERISTICS && field != SKIP_READ_WRITE_DISTRIBUTION {
                return Err(DbError::BadValue(format!(
                    "attempted to set unrecognized parameter [{field}], use help:true to see options "
                )));
            }
            let enabled = value
                .as_bool()
                .ok_or_else(|| DbError::BadValue(format!("{field} must be a boolean, got {value}")))?;
            updates.push((field.as_str(), enabled));
        }

        if updates.is_empty() {
            return Err(DbError::BadValue("no option found to set, use help:true to see options ".into()));
        }

        let mut was = Map::new();
        for (field, enabled) in updates {
            let previous = if field == SKIP_KEY_CHARACTERISTICS {
                self.toggles.set_skip_key_characteristics(enabled)
            } else {
                self.toggles.set_skip_read_write_distribution(enabled)
            };
            info!(
                parameter = field,
                old_value = previous,
                new_value = enabled,
                user = ctx.op.user().username(),
                "Updated server parameter"
            );
            was.insert(field.to_string(), json!(previous));
        }

        let mut fields = Map::new();
        fields.insert("was".to_string(), Value::Object(was));
        Ok(fields)
    }
}
