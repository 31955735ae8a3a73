use crate::core::{DbError, Result};
use serde_json::{Map, Value, json};

/// `{...fields, ok: 1.0}`
pub fn ok_reply(mut fields: Map<String, Value>) -> Value {
    fields.insert("ok".to_string(), json!(1.0));
    Value::Object(fields)
}

/// `{ok: 0.0, errmsg, code, codeName}`
pub fn error_reply(err: &DbError) -> Value {
    json!({
        "ok": 0.0,
        "errmsg": err.to_string(),
        "code": err.code(),
        "codeName": err.code_name(),
    })
}

pub fn into_reply(result: Result<Map<String, Value>>) -> Value {
    match result {
        Ok(fields) => ok_reply(fields),
        Err(err) => error_reply(&err),
    }
}

pub fn is_ok(reply: &Value) -> bool {
    reply.get("ok").and_then(Value::as_f64) == Some(1.0)
}
