/// Result records returned by the echo tools.
///
/// Each record is built fresh per call and serialized as the tool's
/// structured content.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of `echo_message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoMessageResponse {
    pub original_message: String,
    /// The echoed message, uppercased when requested
    pub echoed_message: String,
    pub uppercase_applied: bool,
    /// Length of the original message in characters
    pub message_length: usize,
    pub timestamp: String,
}

/// Result of `echo_with_delay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoDelayResponse {
    pub original_message: String,
    pub echoed_message: String,
    /// Delay actually applied, after clamping (seconds)
    pub requested_delay: f64,
    /// Measured duration of the pause (seconds)
    pub actual_delay: f64,
    pub start_time: String,
    pub end_time: String,
    pub timestamp: String,
}

/// Shape analysis of the top level of an `echo_json` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAnalysis {
    pub key_count: usize,
    /// Top-level keys in input order
    pub keys: Vec<String>,
    /// Top-level key to JSON type name, in input order
    pub data_types: Map<String, Value>,
    /// Byte length of the compact JSON encoding
    pub total_size: usize,
}

/// Result of `echo_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoJsonResponse {
    pub original_data: Map<String, Value>,
    pub echoed_data: Map<String, Value>,
    pub analysis: DataAnalysis,
    pub timestamp: String,
}

/// ISO 8601 rendering used for every timestamp field,
/// e.g. `2025-01-01T12:00:00.123456+00:00`.
pub fn iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub fn now_iso8601() -> String {
    iso8601(Utc::now())
}
