/// echo_json Tool
///
/// Echoes a JSON object back untouched along with a shallow analysis of its
/// top-level keys.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::error::ToolError;
use crate::core::reporter::Reporter;
use crate::core::server::{MCPTool, Tool};
use crate::tools::models::{DataAnalysis, EchoJsonResponse, now_iso8601};
use crate::tools::{required_object, to_result};

pub const NAME: &str = "echo_json";

/// JSON type name of a value. Nested values are not inspected.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Analyse the top level of `data`.
pub fn analyze(data: &Map<String, Value>) -> DataAnalysis {
    DataAnalysis {
        key_count: data.len(),
        keys: data.keys().cloned().collect(),
        data_types: data
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(type_name(value))))
            .collect(),
        // Serializing a Map of Values cannot fail
        total_size: serde_json::to_vec(data).map(|bytes| bytes.len()).unwrap_or(0),
    }
}

/// Build the echo result for `data`.
pub fn echo_json(data: Map<String, Value>) -> EchoJsonResponse {
    let analysis = analyze(&data);
    EchoJsonResponse {
        echoed_data: data.clone(),
        original_data: data,
        analysis,
        timestamp: now_iso8601(),
    }
}

pub struct EchoJsonTool;

#[async_trait]
impl Tool for EchoJsonTool {
    fn definition(&self) -> MCPTool {
        MCPTool {
            name: NAME.to_string(),
            description: "Echo back structured JSON data with validation and analysis.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "data": {
                        "type": "object",
                        "description": "The JSON data to echo back",
                        "additionalProperties": true
                    }
                },
                "required": ["data"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "original_data": {"type": "object", "additionalProperties": true},
                    "echoed_data": {"type": "object", "additionalProperties": true},
                    "analysis": {
                        "type": "object",
                        "properties": {
                            "key_count": {"type": "integer"},
                            "keys": {"type": "array", "items": {"type": "string"}},
                            "data_types": {
                                "type": "object",
                                "additionalProperties": {"type": "string"}
                            },
                            "total_size": {"type": "integer"}
                        },
                        "required": ["key_count", "keys", "data_types", "total_size"]
                    },
                    "timestamp": {"type": "string", "format": "date-time"}
                },
                "required": ["original_data", "echoed_data", "analysis", "timestamp"]
            })),
        }
    }

    async fn call(&self, args: Value, reporter: &dyn Reporter) -> Result<Value, ToolError> {
        let data = required_object(&args, "data")?;

        reporter.info(&format!("Echoing JSON data with {} keys...", data.len()));

        let response = echo_json(data);
        to_result(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::NoopReporter;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Map<String, Value> {
        match json!({"key1": "value1", "key2": 123, "key3": true, "nested": {"a": 1, "b": 2}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn analyses_top_level_keys() {
        let result = echo_json(sample());
        assert_eq!(result.original_data, sample());
        assert_eq!(result.echoed_data, sample());

        let analysis = result.analysis;
        assert_eq!(analysis.key_count, 4);
        assert_eq!(analysis.keys, vec!["key1", "key2", "key3", "nested"]);
        assert_eq!(analysis.data_types["key1"], "string");
        assert_eq!(analysis.data_types["key2"], "integer");
        assert_eq!(analysis.data_types["key3"], "boolean");
        assert_eq!(analysis.data_types["nested"], "object");
    }

    #[test]
    fn total_size_is_compact_utf8_length() {
        let mut data = Map::new();
        data.insert("k".to_string(), json!("é"));
        // {"k":"é"} with é encoded as two bytes
        assert_eq!(analyze(&data).total_size, 10);
        assert_eq!(analyze(&sample()).total_size, serde_json::to_string(&sample()).unwrap().len());
        assert_eq!(analyze(&Map::new()).total_size, 2);
    }

    #[test]
    fn type_names_cover_every_json_kind() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!(1.5)), "number");
        assert_eq!(type_name(&json!(-7)), "integer");
        assert_eq!(type_name(&json!([1, "a"])), "array");
    }

    #[tokio::test]
    async fn rejects_non_object_data() {
        for bad in [json!([1, 2]), json!("text"), json!(3)] {
            let err = EchoJsonTool
                .call(json!({"data": bad}), &NoopReporter)
                .await
                .unwrap_err();
            assert_eq!(err, ToolError::invalid("data", "a JSON object"));
        }

        let err = EchoJsonTool.call(json!({}), &NoopReporter).await.unwrap_err();
        assert_eq!(err, ToolError::missing("data"));
    }

    #[test]
    fn analysis_follows_input_key_order() {
        let mut data = Map::new();
        data.insert("zeta".to_string(), json!(1));
        data.insert("alpha".to_string(), json!("a"));

        let analysis = analyze(&data);
        assert_eq!(analysis.keys, vec!["zeta", "alpha"]);
        let type_keys: Vec<&String> = analysis.data_types.keys().collect();
        assert_eq!(type_keys, vec!["zeta", "alpha"]);

        let encoded = serde_json::to_string(&analysis.data_types).unwrap();
        assert_eq!(encoded, r#"{"zeta":"integer","alpha":"string"}"#);
    }

    /// Arbitrary JSON values, nested up to a few levels, with unsorted keys.
    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            any::<f64>().prop_map(Value::from),
            "\\PC{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 48, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
                proptest::collection::vec(("\\PC{0,8}", inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Map<String, Value>> {
        proptest::collection::vec(("\\PC{0,8}", arb_json()), 0..10)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        #[test]
        fn echo_is_lossless_for_any_object(data in arb_object()) {
            let mut first = echo_json(data.clone());
            prop_assert_eq!(&first.original_data, &data);
            prop_assert_eq!(&first.echoed_data, &data);

            let analysis = &first.analysis;
            prop_assert_eq!(analysis.key_count, data.len());
            let expected_keys: Vec<String> = data.keys().cloned().collect();
            prop_assert_eq!(&analysis.keys, &expected_keys);
            let type_keys: Vec<String> = analysis.data_types.keys().cloned().collect();
            prop_assert_eq!(&type_keys, &expected_keys);
            for (key, value) in &data {
                prop_assert_eq!(&analysis.data_types[key], &Value::from(type_name(value)));
            }
            prop_assert_eq!(analysis.total_size, serde_json::to_vec(&data).unwrap().len());

            let mut second = echo_json(data);
            first.timestamp.clear();
            second.timestamp.clear();
            prop_assert_eq!(first, second);
        }
    }
}
