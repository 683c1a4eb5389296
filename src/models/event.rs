use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// An event as reported by the feed, before any cleaning.
///
/// Range-checked numeric fields stay as JSON values until validation so that
/// strings and booleans can be told apart from numbers.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event_id: String,
    pub detail_url: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
    pub place: Option<String>,
    pub felt: Option<Value>,
    pub tsunami: Option<Value>,
    pub magnitude: Value,
    pub network: Option<String>,
    pub alert: Option<String>,
    pub magnitude_type: Option<String>,
    pub event_type: Option<String>,
    pub cdi: Option<Value>,
    pub longitude: Value,
    pub latitude: Value,
    pub depth: Value,
}

/// A defaulted, range-validated event ready for dimension resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedEvent {
    pub event_id: String,
    pub detail_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub place: Option<String>,
    pub felt: i32,
    pub tsunami: bool,
    pub magnitude: f64,
    pub network: Option<String>,
    pub alert: String,
    pub magnitude_type: Option<String>,
    pub event_type: Option<String>,
    pub cdi: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
}
