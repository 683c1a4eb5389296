use crate::db::store::Store;
use crate::error::PipelineError;
use crate::models::earthquake::PersistedEarthquake;
use crate::processor::regions::regions_for;
use crate::publisher::Publisher;
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info};

/// Magnitude thresholds that segment the notification topics.
pub const TIERS: [u8; 3] = [0, 4, 7];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotifySummary {
    pub published: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for NotifySummary {
    fn add_assign(&mut self, other: Self) {
        self.published += other.published;
        self.failed += other.failed;
    }
}

/// Turns a region name into the token used in topic names.
pub fn topic_base(region_name: &str) -> String {
    region_name
        .replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, ',' | '&' | '(' | ')'))
        .collect()
}

/// Tier 0 is always notified; higher tiers once the magnitude reaches them.
pub fn topic_names(region_name: &str, magnitude: f64) -> Vec<String> {
    let base = topic_base(region_name);
    TIERS
        .iter()
        .filter(|&&tier| tier == 0 || magnitude >= f64::from(tier))
        .map(|tier| format!("{}_{}", base, tier))
        .collect()
}

pub fn alert_message(quake: &PersistedEarthquake) -> String {
    let event = &quake.event;
    format!(
        "Warning! Alert Level {}\nEarthquake of magnitude {} {} ({},{}) at {}",
        title_case(&event.alert),
        decimal(event.magnitude),
        event.place.as_deref().unwrap_or("at an unknown location"),
        decimal(event.latitude),
        decimal(event.longitude),
        event.occurred_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Whole numbers keep one decimal place, so 5.0 reads `5.0` rather than `5`.
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Publishes an alert to every topic the earthquake qualifies for.
///
/// Each topic is attempted independently; a failed lookup or publish is logged
/// and counted without affecting the others.
pub async fn notify(
    store: &dyn Store,
    publisher: &dyn Publisher,
    quake: &PersistedEarthquake,
) -> Result<NotifySummary, PipelineError> {
    let regions = regions_for(store, quake.event.latitude, quake.event.longitude).await?;
    let topics: Vec<String> = regions
        .iter()
        .flat_map(|region| topic_names(region, quake.event.magnitude))
        .collect();

    if topics.is_empty() {
        info!("Earthquake {} matched no regions", quake.earthquake_id);
        return Ok(NotifySummary::default());
    }

    info!(
        "Notifying {} topic(s) for earthquake {}",
        topics.len(),
        quake.earthquake_id
    );
    let message = alert_message(quake);
    let results = join_all(
        topics
            .iter()
            .map(|topic| publish_to_topic(store, publisher, topic, &quake.event.event_id, &message)),
    )
    .await;

    let mut summary = NotifySummary::default();
    for (topic, result) in topics.iter().zip(results) {
        match result {
            Ok(()) => summary.published += 1,
            Err(e) => {
                error!("Could not send notification to topic {}: {}", topic, e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

async fn publish_to_topic(
    store: &dyn Store,
    publisher: &dyn Publisher,
    topic_name: &str,
    key: &str,
    message: &str,
) -> Result<(), PipelineError> {
    let target = store.topic_target(topic_name).await?;
    publisher.publish(&target, key, message).await
}
