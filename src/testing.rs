//! In-memory doubles of the feed, storage and publish clients.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::db::store::{Dimension, Store};
use crate::error::PipelineError;
use crate::feed::FeedClient;
use crate::models::earthquake::{DimensionKeys, NewEarthquake, PersistedEarthquake};
use crate::models::event::{CleanedEvent, RawEvent};
use crate::models::feed::FeedDocument;
use crate::models::region::Region;
use crate::publisher::Publisher;

pub fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 3, hour, minute, second).unwrap()
}

/// A feed feature shaped like the USGS summary, updated at `updated`.
pub fn feature(id: &str, updated: DateTime<Utc>, magnitude: f64, lat: f64, lon: f64) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "properties": {
            "mag": magnitude,
            "place": "10 km NE of Ridgecrest, California",
            "time": updated.timestamp_millis() - 60_000,
            "updated": updated.timestamp_millis(),
            "detail": format!("https://earthquake.usgs.gov/earthquakes/feed/v1.0/detail/{id}.geojson"),
            "felt": null,
            "cdi": null,
            "alert": null,
            "tsunami": 0,
            "net": "ci",
            "magType": "ml",
            "type": "earthquake"
        },
        "geometry": { "type": "Point", "coordinates": [lon, lat, 7.5] }
    })
}

pub fn raw_event(id: &str) -> RawEvent {
    RawEvent {
        event_id: id.to_string(),
        detail_url: Some(format!("https://example.com/{id}")),
        updated_at: at(14, 30, 0),
        occurred_at: Utc.timestamp_millis_opt(1_733_236_200_987).unwrap(),
        place: Some("8 km SW of Volcano, Hawaii".to_string()),
        felt: None,
        tsunami: Some(json!(0)),
        magnitude: json!(1.79),
        network: Some("hv".to_string()),
        alert: None,
        magnitude_type: Some("md".to_string()),
        event_type: Some("earthquake".to_string()),
        cdi: None,
        longitude: json!(-155.28),
        latitude: json!(19.38),
        depth: json!(0.84),
    }
}

pub fn cleaned_event(id: &str, network: &str) -> CleanedEvent {
    CleanedEvent {
        event_id: id.to_string(),
        detail_url: Some(format!("https://example.com/{id}")),
        occurred_at: at(14, 29, 12),
        place: Some("10 km NE of Ridgecrest, California".to_string()),
        felt: 4,
        tsunami: false,
        magnitude: 4.25,
        network: Some(network.to_string()),
        alert: "yellow".to_string(),
        magnitude_type: Some("ml".to_string()),
        event_type: Some("earthquake".to_string()),
        cdi: 3.2,
        longitude: -117.5245,
        latitude: 35.7038,
        depth: 7.5,
    }
}

pub fn persisted(magnitude: f64, latitude: f64, longitude: f64) -> PersistedEarthquake {
    let mut event = cleaned_event("ci0001", "ci");
    event.magnitude = magnitude;
    event.latitude = latitude;
    event.longitude = longitude;
    PersistedEarthquake {
        earthquake_id: 1,
        created_at: at(14, 30, 5),
        event,
        keys: DimensionKeys {
            alert_id: 1,
            magnitude_id: 1,
            network_id: 1,
            type_id: 1,
        },
    }
}

pub fn region(name: &str, lat: (f64, f64), lon: (f64, f64)) -> Region {
    Region {
        region_name: name.to_string(),
        min_latitude: lat.0,
        max_latitude: lat.1,
        min_longitude: lon.0,
        max_longitude: lon.1,
    }
}

pub struct StaticFeed {
    features: Option<Vec<Value>>,
}

impl StaticFeed {
    pub fn new(features: Vec<Value>) -> Self {
        Self {
            features: Some(features),
        }
    }

    /// A feed that always answers 503.
    pub fn unavailable() -> Self {
        Self { features: None }
    }
}

#[async_trait]
impl FeedClient for StaticFeed {
    async fn fetch(&self) -> Result<FeedDocument, PipelineError> {
        match &self.features {
            Some(features) => Ok(FeedDocument {
                features: features.clone(),
            }),
            None => Err(PipelineError::FeedStatus(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            )),
        }
    }
}

/// Reference data plus whatever the pipeline inserted.
#[derive(Default)]
pub struct MemoryStore {
    dimensions: HashMap<(Dimension, String), i32>,
    regions: Vec<Region>,
    topics: HashMap<String, String>,
    fail_inserts: bool,
    insert_delay: Option<Duration>,
    fail_region_lookups: bool,
    next_id: AtomicI64,
    rows: Mutex<Vec<PersistedEarthquake>>,
    commits: AtomicUsize,
}

impl MemoryStore {
    /// Seeded with the dimension values used by the fixtures.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        for (i, alert) in ["green", "yellow", "orange", "red"].iter().enumerate() {
            store.dimension(Dimension::Alert, alert, i as i32 + 1);
        }
        for (i, mag_type) in ["md", "ml", "mb", "mww"].iter().enumerate() {
            store.dimension(Dimension::MagnitudeType, mag_type, i as i32 + 1);
        }
        for (i, net) in ["ci", "hv", "ak", "us"].iter().enumerate() {
            store.dimension(Dimension::Network, net, i as i32 + 1);
        }
        store.dimension(Dimension::EventType, "earthquake", 1);
        store.dimension(Dimension::EventType, "quarry blast", 2);
        store
    }

    pub fn dimension(&mut self, dimension: Dimension, value: &str, id: i32) -> &mut Self {
        self.dimensions.insert((dimension, value.to_string()), id);
        self
    }

    /// Adds a region and registers its three tier topics.
    pub fn region(&mut self, region: Region) -> &mut Self {
        let base = crate::processor::notify::topic_base(&region.region_name);
        for tier in crate::processor::notify::TIERS {
            let name = format!("{base}_{tier}");
            self.topics.insert(name.clone(), format!("quake.{name}"));
        }
        self.regions.push(region);
        self
    }

    pub fn without_topic(&mut self, topic_name: &str) -> &mut Self {
        self.topics.remove(topic_name);
        self
    }

    pub fn failing_inserts(&mut self) -> &mut Self {
        self.fail_inserts = true;
        self
    }

    pub fn failing_region_lookups(&mut self) -> &mut Self {
        self.fail_region_lookups = true;
        self
    }

    /// Holds each insert open for `delay` before anything is written.
    pub fn slow_inserts(&mut self, delay: Duration) -> &mut Self {
        self.insert_delay = Some(delay);
        self
    }

    pub fn rows(&self) -> Vec<PersistedEarthquake> {
        self.rows.lock().unwrap().clone()
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn resolve_dimension(
        &self,
        dimension: Dimension,
        value: &str,
    ) -> Result<i32, PipelineError> {
        self.dimensions
            .get(&(dimension, value.to_string()))
            .copied()
            .ok_or_else(|| PipelineError::not_found(dimension.as_str(), value))
    }

    async fn insert_batch(
        &self,
        rows: &[NewEarthquake],
    ) -> Result<Vec<PersistedEarthquake>, PipelineError> {
        if self.fail_inserts {
            return Err(PipelineError::Storage(sqlx::Error::PoolClosed));
        }
        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }

        let mut stored = self.rows.lock().unwrap();
        let mut seen: HashSet<String> = stored.iter().map(|r| r.event.event_id.clone()).collect();
        let mut inserted = Vec::new();
        for row in rows {
            if !seen.insert(row.event.event_id.clone()) {
                continue;
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let persisted = PersistedEarthquake::from_new(row.clone(), id, at(14, 30, 30));
            stored.push(persisted.clone());
            inserted.push(persisted);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(inserted)
    }

    async fn regions_containing(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Region>, PipelineError> {
        if self.fail_region_lookups {
            return Err(PipelineError::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .regions
            .iter()
            .filter(|r| r.contains(latitude, longitude))
            .cloned()
            .collect())
    }

    async fn topic_target(&self, topic_name: &str) -> Result<String, PipelineError> {
        self.topics
            .get(topic_name)
            .cloned()
            .ok_or_else(|| PipelineError::not_found("topic", topic_name))
    }
}

/// Records every publish; targets listed in `failing` reject the message.
#[derive(Default)]
pub struct RecordingPublisher {
    failing: HashSet<String>,
    delay: Option<Duration>,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingPublisher {
    pub fn failing_on(targets: &[&str]) -> Self {
        Self {
            failing: targets.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    /// A broker that takes `delay` to acknowledge every message.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Targets that accepted a message, sorted.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect();
        targets.sort();
        targets
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, target: &str, _key: &str, message: &str) -> Result<(), PipelineError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(target) {
            return Err(PipelineError::Publish {
                target: target.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((target.to_string(), message.to_string()));
        Ok(())
    }
}
