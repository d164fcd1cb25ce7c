use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Field-keyed validation failure: `details.fields` maps each invalid field
/// to one human-readable message.
pub fn validation(id: &str, fields: &[crate::gateway::FieldError]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for f in fields {
        map.insert(f.field.to_string(), json!(f.message));
    }
    err(
        id,
        "validation",
        "one or more fields are invalid",
        Some(json!({ "fields": map })),
    )
}
