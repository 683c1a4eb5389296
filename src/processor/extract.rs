use crate::error::PipelineError;
use crate::feed::FeedClient;
use crate::models::event::RawEvent;
use crate::models::feed::Feature;
use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Fetches the feed and keeps the events updated since the previous run,
/// judged against `now`.
pub async fn fetch_recent_at(
    feed: &dyn FeedClient,
    now: DateTime<Utc>,
) -> Result<Vec<RawEvent>, PipelineError> {
    let document = feed.fetch().await?;
    let total = document.features.len();

    let mut events = Vec::new();
    for value in document.features {
        match to_raw_event(value, now) {
            Ok(Some(event)) => {
                debug!("Keeping {} updated at {}", event.event_id, event.updated_at);
                events.push(event);
            }
            Ok(None) => {}
            Err(reason) => warn!("Skipping feed feature: {}", reason),
        }
    }

    info!("Retrieved {} of {} earthquake records", events.len(), total);
    Ok(events)
}

/// Trailing window sized for a once-per-minute schedule: the same clock hour,
/// and no earlier than the previous minute.
pub fn in_window(updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    updated.date_naive() == now.date_naive()
        && updated.hour() == now.hour()
        && i64::from(updated.minute()) >= i64::from(now.minute()) - 1
}

/// `Ok(None)` means the feature is well formed but outside the window.
fn to_raw_event(value: Value, now: DateTime<Utc>) -> Result<Option<RawEvent>, String> {
    let feature: Feature =
        serde_json::from_value(value).map_err(|e| format!("malformed feature: {}", e))?;
    let id = feature.id.unwrap_or_default();
    let properties = feature
        .properties
        .ok_or_else(|| format!("feature {:?} has no properties", id))?;

    let updated_at = properties
        .updated
        .and_then(from_millis)
        .ok_or_else(|| format!("feature {:?} has no valid updated timestamp", id))?;
    if !in_window(updated_at, now) {
        return Ok(None);
    }

    if id.is_empty() {
        return Err("feature has no id".to_string());
    }
    let occurred_at = properties
        .time
        .and_then(from_millis)
        .ok_or_else(|| format!("feature {:?} has no valid time", id))?;
    let geometry = feature
        .geometry
        .ok_or_else(|| format!("feature {:?} has no geometry", id))?;
    let (longitude, latitude) = match (geometry.longitude(), geometry.latitude()) {
        (Some(lon), Some(lat)) => (lon.clone(), lat.clone()),
        _ => return Err(format!("feature {:?} is missing coordinates", id)),
    };
    let depth = geometry.depth().cloned().unwrap_or(Value::Null);

    Ok(Some(RawEvent {
        event_id: id,
        detail_url: properties.detail,
        updated_at,
        occurred_at,
        place: properties.place,
        felt: properties.felt,
        tsunami: properties.tsunami,
        magnitude: properties.mag.unwrap_or(Value::Null),
        network: properties.net,
        alert: properties.alert,
        magnitude_type: properties.mag_type,
        event_type: properties.event_type,
        cdi: properties.cdi,
        longitude,
        latitude,
        depth,
    }))
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
