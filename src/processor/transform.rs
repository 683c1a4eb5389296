use crate::error::PipelineError;
use crate::models::event::{CleanedEvent, RawEvent};
use crate::processor::validator;
use chrono::Timelike;
use serde_json::Value;
use tracing::{info, warn};

pub const DEFAULT_ALERT: &str = "green";

/// Fills defaults, truncates timestamps and drops events failing any range check.
///
/// An empty batch is rejected: the caller is expected to short-circuit before
/// reaching this stage when nothing was extracted.
pub fn clean(raw: &[RawEvent]) -> Result<Vec<CleanedEvent>, PipelineError> {
    if raw.is_empty() {
        return Err(PipelineError::InvalidInput(
            "earthquake batch is empty, transformation cannot proceed".to_string(),
        ));
    }

    info!("Cleaning {} earthquake records", raw.len());
    let cleaned: Vec<CleanedEvent> = raw.iter().filter_map(clean_one).collect();

    let dropped = raw.len() - cleaned.len();
    if dropped > 0 {
        warn!("Removed {} invalid earthquake records", dropped);
    }
    Ok(cleaned)
}

fn clean_one(event: &RawEvent) -> Option<CleanedEvent> {
    let felt = coerce_number(event.felt.as_ref()).unwrap_or(0.0);
    let cdi = coerce_number(event.cdi.as_ref()).unwrap_or(0.0);
    let cdi_value = Value::from(cdi);

    let checks: [(&str, &Value, fn(&Value) -> bool); 5] = [
        ("latitude", &event.latitude, validator::is_valid_latitude),
        ("longitude", &event.longitude, validator::is_valid_longitude),
        ("magnitude", &event.magnitude, validator::is_valid_magnitude),
        ("cdi", &cdi_value, validator::is_valid_cdi),
        ("depth", &event.depth, validator::is_valid_depth),
    ];
    if let Some((field, value, _)) = checks.iter().find(|check| !(check.2)(check.1)) {
        warn!("Dropping event {}: invalid {} {}", event.event_id, field, value);
        return None;
    }

    Some(CleanedEvent {
        event_id: event.event_id.clone(),
        detail_url: event.detail_url.clone(),
        occurred_at: event.occurred_at.with_nanosecond(0)?,
        place: event.place.clone(),
        felt: felt as i32,
        tsunami: is_tsunami(event.tsunami.as_ref()),
        magnitude: event.magnitude.as_f64()?,
        network: event.network.clone(),
        alert: event
            .alert
            .clone()
            .unwrap_or_else(|| DEFAULT_ALERT.to_string()),
        magnitude_type: event.magnitude_type.clone(),
        event_type: event.event_type.clone(),
        cdi,
        longitude: event.longitude.as_f64()?,
        latitude: event.latitude.as_f64()?,
        depth: event.depth.as_f64()?,
    })
}

/// Numbers and numeric strings; anything else is treated as missing.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn is_tsunami(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(v) => coerce_number(Some(v)).is_some_and(|n| n != 0.0),
        None => false,
    }
}
