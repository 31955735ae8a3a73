use super::{Command, CommandContext, into_fields, reject_unknown_fields};
use crate::analysis::{AnalyzeShardKeyRequest, ShardKeyAnalysisOrchestrator};
use crate::connection::auth::{ActionType, ResourcePattern, User};
use crate::core::{DbError, Namespace, Result, ShardKeyPattern};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const NAME: &str = "analyzeShardKey";

/// `{analyzeShardKey: "<db>.<coll>", key: {<path>: 1 | "hashed", ...}}`
pub struct AnalyzeShardKeyCommand {
    orchestrator: Arc<ShardKeyAnalysisOrchestrator>,
}

impl AnalyzeShardKeyCommand {
    pub fn new(orchestrator: Arc<ShardKeyAnalysisOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn parse(body: &Map<String, Value>) -> Result<AnalyzeShardKeyRequest> {
        reject_unknown_fields(body, &[NAME, "key"])?;

        let namespace = match body.get(NAME) {
            Some(Value::String(raw)) => Namespace::parse(raw)?,
            Some(other) => {
                return Err(DbError::InvalidNamespace(format!(
                    "collection name has invalid type {}",
                    json_type_name(other)
                )));
            }
            None => return Err(DbError::FailedToParse(format!("missing '{NAME}' field"))),
        };

        let key = body
            .get("key")
            .ok_or_else(|| DbError::FailedToParse(format!("BSON field '{NAME}.key' is missing but a required field")))?;
        let key = ShardKeyPattern::from_json(key)?;

        Ok(AnalyzeShardKeyRequest::new(namespace, key))
    }

    /// Requires `shardCollection` on the exact target namespace.
    pub fn check_authorization(user: &User, nss: &Namespace) -> Result<()> {
        let resource = ResourcePattern::for_exact_namespace(nss);
        if !user.is_authorized_for_actions_on_resource(&resource, &[ActionType::ShardCollection]) {
            return Err(DbError::Unauthorized("Unauthorized".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Command for AnalyzeShardKeyCommand {
    fn name(&self) -> &'static str {
        NAME
    }

    fn help(&self) -> &'static str {
        "Returns metrics for evaluating a shard key for a collection."
    }

    fn admin_only(&self) -> bool {
        true
    }

    fn maintenance_ok(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &CommandContext<'_>, body: &Map<String, Value>) -> Result<Map<String, Value>> {
        let request = Self::parse(body)?;
        Self::check_authorization(ctx.op.user(), &request.namespace)?;

        let response = self.orchestrator.run(ctx.op, &request, ctx.deployment).await?;
        into_fields(&response)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::auth::Privilege;
    use serde_json::json;

    fn parse(doc: Value) -> Result<AnalyzeShardKeyRequest> {
        AnalyzeShardKeyCommand::parse(doc.as_object().unwrap())
    }

    #[test]
    fn test_parse_request() {
        let request = parse(json!({
            "analyzeShardKey": "db.orders",
            "key": {"customerId": 1, "orderId": "hashed"},
            "maxTimeMS": 1000
        }))
        .unwrap();

        assert_eq!(request.namespace.to_string(), "db.orders");
        assert_eq!(request.key.to_string(), r#"{"customerId":1,"orderId":"hashed"}"#);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse(json!({"analyzeShardKey": 5, "key": {"a": 1}})).unwrap_err();
        assert_eq!(err.code_name(), "InvalidNamespace");

        let err = parse(json!({"analyzeShardKey": "orders", "key": {"a": 1}})).unwrap_err();
        assert_eq!(err.code_name(), "InvalidNamespace");

        let err = parse(json!({"analyzeShardKey": "db.orders"})).unwrap_err();
        assert_eq!(err.code_name(), "FailedToParse");

        let err = parse(json!({"analyzeShardKey": "db.orders", "key": {}})).unwrap_err();
        assert_eq!(err.code_name(), "BadValue");

        let err = parse(json!({"analyzeShardKey": "db.orders", "key": {"a": 1}, "sampleRate": 2})).unwrap_err();
        assert_eq!(err, DbError::UnknownField("sampleRate".into()));
    }

    #[test]
    fn test_authorization_requires_exact_namespace_privilege() {
        let orders = Namespace::parse("db.orders").unwrap();
        let granted = User::new(
            "analyst".into(),
            "hash".into(),
            vec![Privilege::new(
                ResourcePattern::for_exact_namespace(&orders),
                vec![ActionType::ShardCollection],
            )],
        );
        assert!(AnalyzeShardKeyCommand::check_authorization(&granted, &orders).is_ok());

        let other = Namespace::parse("db.customers").unwrap();
        let err = AnalyzeShardKeyCommand::check_authorization(&granted, &other).unwrap_err();
        assert_eq!(err, DbError::Unauthorized("Unauthorized".into()));

        let cluster_wide = User::new(
            "clusterops".into(),
            "hash".into(),
            vec![Privilege::new(ResourcePattern::Cluster, vec![ActionType::ShardCollection])],
        );
        assert!(AnalyzeShardKeyCommand::check_authorization(&cluster_wide, &orders).is_err());
    }
}
