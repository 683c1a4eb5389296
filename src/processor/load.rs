use crate::db::store::{Dimension, Store};
use crate::error::PipelineError;
use crate::models::earthquake::{DimensionKeys, NewEarthquake, PersistedEarthquake};
use crate::models::event::CleanedEvent;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub inserted_count: usize,
    /// Records dropped because a dimension could not be resolved.
    pub skipped_count: usize,
    /// Records already present from an earlier run.
    pub duplicate_count: usize,
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub summary: LoadSummary,
    pub persisted: Vec<PersistedEarthquake>,
}

/// Resolves one dimension value, treating an absent value as unresolvable.
pub async fn resolve(
    store: &dyn Store,
    dimension: Dimension,
    value: Option<&str>,
) -> Result<i32, PipelineError> {
    let value = value.ok_or_else(|| PipelineError::not_found(dimension.as_str(), ""))?;
    store.resolve_dimension(dimension, value).await
}

async fn resolve_keys(store: &dyn Store, event: &CleanedEvent) -> Result<DimensionKeys, PipelineError> {
    Ok(DimensionKeys {
        alert_id: resolve(store, Dimension::Alert, Some(&event.alert)).await?,
        magnitude_id: resolve(store, Dimension::MagnitudeType, event.magnitude_type.as_deref()).await?,
        network_id: resolve(store, Dimension::Network, event.network.as_deref()).await?,
        type_id: resolve(store, Dimension::EventType, event.event_type.as_deref()).await?,
    })
}

/// Persists every event whose dimensions resolve, in a single committed batch.
///
/// Unresolvable events are skipped; a storage failure on the batch is returned
/// to the caller and nothing is committed.
pub async fn load(store: &dyn Store, events: &[CleanedEvent]) -> Result<LoadOutcome, PipelineError> {
    let mut rows = Vec::with_capacity(events.len());
    let mut skipped_count = 0;

    for event in events {
        match resolve_keys(store, event).await {
            Ok(keys) => rows.push(NewEarthquake {
                event: event.clone(),
                keys,
            }),
            Err(e @ PipelineError::NotFound { .. }) => {
                warn!("Skipping event {}: {}", event.event_id, e);
                skipped_count += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if rows.is_empty() {
        warn!("No valid records to insert");
        return Ok(LoadOutcome {
            summary: LoadSummary {
                skipped_count,
                ..Default::default()
            },
            persisted: Vec::new(),
        });
    }

    info!("Inserting {} records into the earthquake table", rows.len());
    let persisted = store.insert_batch(&rows).await?;

    let duplicate_count = rows.len() - persisted.len();
    if duplicate_count > 0 {
        info!("{} records were already stored", duplicate_count);
    }

    Ok(LoadOutcome {
        summary: LoadSummary {
            inserted_count: persisted.len(),
            skipped_count,
            duplicate_count,
        },
        persisted,
    })
}
