/// Tools Module
///
/// Each tool lives in its own module and implements `core::server::Tool`.
/// `register_all` adds them to the registry in discovery order.

pub mod delay;
pub mod echo;
pub mod json;
pub mod models;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::ToolError;
use crate::core::server::ToolRegistry;

/// Register every tool this server exposes.
pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(echo::EchoMessageTool);
    registry.register(delay::EchoWithDelayTool);
    registry.register(json::EchoJsonTool);
}

/// Encode a tool's result record as its structured content.
pub(crate) fn to_result<T: Serialize>(response: T) -> Result<Value, ToolError> {
    serde_json::to_value(response).map_err(|e| ToolError::Encode(e.to_string()))
}

/// Extract a required string argument.
pub(crate) fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    match args.get(field) {
        None => Err(ToolError::missing(field)),
        Some(value) => value.as_str().ok_or_else(|| ToolError::invalid(field, "a string")),
    }
}

/// Extract an optional boolean argument, falling back to `default` when absent.
pub(crate) fn optional_bool(args: &Value, field: &str, default: bool) -> Result<bool, ToolError> {
    match args.get(field) {
        None => Ok(default),
        Some(value) => value.as_bool().ok_or_else(|| ToolError::invalid(field, "a boolean")),
    }
}

/// Extract an optional finite number, falling back to `default` when absent.
pub(crate) fn optional_f64(args: &Value, field: &str, default: f64) -> Result<f64, ToolError> {
    match args.get(field) {
        None => Ok(default),
        Some(value) => value
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ToolError::invalid(field, "a number")),
    }
}

/// Extract a required JSON object argument.
pub(crate) fn required_object(args: &Value, field: &str) -> Result<Map<String, Value>, ToolError> {
    match args.get(field) {
        None => Err(ToolError::missing(field)),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ToolError::invalid(field, "a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_arguments_report_missing_and_wrong_type() {
        let args = json!({"message": 42});
        assert_eq!(
            required_str(&json!({}), "message"),
            Err(ToolError::missing("message"))
        );
        assert_eq!(
            required_str(&args, "message"),
            Err(ToolError::invalid("message", "a string"))
        );
        assert!(required_object(&json!({"data": [1, 2]}), "data").is_err());
        assert!(required_object(&json!({"data": null}), "data").is_err());
    }

    #[test]
    fn unencodable_result_is_an_error() {
        // Non-string map keys cannot become a JSON object
        let mut bad = std::collections::BTreeMap::new();
        bad.insert((1u8, 2u8), "pair");
        let err = to_result(bad).unwrap_err();
        assert!(matches!(err, ToolError::Encode(_)));
        assert!(!err.is_validation());

        assert_eq!(to_result(vec![1, 2]), Ok(json!([1, 2])));
    }

    #[test]
    fn optional_arguments_use_defaults_only_when_absent() {
        assert_eq!(optional_bool(&json!({}), "uppercase", false), Ok(false));
        assert_eq!(optional_bool(&json!({"uppercase": true}), "uppercase", false), Ok(true));
        assert!(optional_bool(&json!({"uppercase": "yes"}), "uppercase", false).is_err());

        assert_eq!(optional_f64(&json!({}), "delay_seconds", 1.0), Ok(1.0));
        assert_eq!(optional_f64(&json!({"delay_seconds": 2}), "delay_seconds", 1.0), Ok(2.0));
        assert!(optional_f64(&json!({"delay_seconds": null}), "delay_seconds", 1.0).is_err());
        assert!(optional_f64(&json!({"delay_seconds": "2"}), "delay_seconds", 1.0).is_err());
    }
}
