use chrono::{DateTime, Utc};
use serde::Serialize;

use super::event::CleanedEvent;

/// Foreign keys into the four dimension tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionKeys {
    pub alert_id: i32,
    pub magnitude_id: i32,
    pub network_id: i32,
    pub type_id: i32,
}

/// A cleaned event whose dimensions have all been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEarthquake {
    pub event: CleanedEvent,
    pub keys: DimensionKeys,
}

/// A row of the `earthquakes` table written by the current run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedEarthquake {
    pub earthquake_id: i64,
    pub created_at: DateTime<Utc>,
    pub event: CleanedEvent,
    pub keys: DimensionKeys,
}

impl PersistedEarthquake {
    pub fn from_new(new: NewEarthquake, earthquake_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            earthquake_id,
            created_at,
            event: new.event,
            keys: new.keys,
        }
    }
}
