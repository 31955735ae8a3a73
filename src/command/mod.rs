pub mod analyze_shard_key;
pub mod registry;
pub mod reply;
pub mod set_parameter;

use crate::connection::OperationContext;
use crate::core::{DbError, DeploymentContext, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use analyze_shard_key::AnalyzeShardKeyCommand;
pub use registry::CommandRegistry;
pub use set_parameter::SetParameterCommand;

/// Arguments every command accepts in addition to its own fields.
pub const GENERIC_ARGUMENTS: [&str; 5] = ["maxTimeMS", "writeConcern", "comment", "$db", "lsid"];

pub fn is_generic_argument(field: &str) -> bool {
    GENERIC_ARGUMENTS.contains(&field)
}

/// What a command sees of the invocation it runs in.
pub struct CommandContext<'a> {
    pub op: &'a OperationContext,
    pub db: &'a str,
    pub deployment: &'a DeploymentContext,
}

/// A named administrative command.
///
/// The registry enforces the declared properties (admin-only, maintenance
/// mode, write concern) before `run` is called; `run` parses the body,
/// checks authorization and does the work.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn help(&self) -> &'static str;

    fn admin_only(&self) -> bool {
        false
    }

    fn maintenance_ok(&self) -> bool {
        true
    }

    fn supports_write_concern(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &CommandContext<'_>, body: &Map<String, Value>) -> Result<Map<String, Value>>;
}

/// Rejects any field that is neither known to the command nor generic.
pub(crate) fn reject_unknown_fields(body: &Map<String, Value>, known: &[&str]) -> Result<()> {
    for field in body.keys() {
        if !known.contains(&field.as_str()) && !is_generic_argument(field) {
            return Err(DbError::UnknownField(field.clone()));
        }
    }
    Ok(())
}

/// Converts a serializable reply body into the field map of a command reply.
pub(crate) fn into_fields<T: serde::Serialize>(body: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(body)? {
        Value::Object(fields) => Ok(fields),
        other => Err(DbError::InternalError(format!(
            "command reply must be an object, got {other}"
        ))),
    }
}
