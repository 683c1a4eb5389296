use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::db::{queries, DbPool};
use crate::error::PipelineError;
use crate::models::earthquake::{NewEarthquake, PersistedEarthquake};
use crate::models::region::Region;

/// Keeps each INSERT comfortably below the Postgres bind-parameter limit.
const INSERT_CHUNK_SIZE: usize = 1000;

/// The categorical attributes stored in their own reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Alert,
    MagnitudeType,
    Network,
    EventType,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Alert => "alert",
            Dimension::MagnitudeType => "magnitude type",
            Dimension::Network => "network",
            Dimension::EventType => "event type",
        }
    }

    /// Table and column are fixed per variant; only the looked-up value is bound.
    fn lookup_query(&self) -> &'static str {
        match self {
            Dimension::Alert => queries::SELECT_ALERT_ID,
            Dimension::MagnitudeType => queries::SELECT_MAGNITUDE_TYPE_ID,
            Dimension::Network => queries::SELECT_NETWORK_ID,
            Dimension::EventType => queries::SELECT_EVENT_TYPE_ID,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage accessor used by the pipeline stages.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the id of the reference row equal to `value`, or `NotFound`.
    async fn resolve_dimension(
        &self,
        dimension: Dimension,
        value: &str,
    ) -> Result<i32, PipelineError>;

    /// Inserts all rows in one transaction with a single commit.
    ///
    /// Rows whose `event_id` is already stored are left out of the result.
    async fn insert_batch(
        &self,
        rows: &[NewEarthquake],
    ) -> Result<Vec<PersistedEarthquake>, PipelineError>;

    async fn regions_containing(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Region>, PipelineError>;

    /// Looks up the publish target registered for a topic name.
    async fn topic_target(&self, topic_name: &str) -> Result<String, PipelineError>;
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn resolve_dimension(
        &self,
        dimension: Dimension,
        value: &str,
    ) -> Result<i32, PipelineError> {
        sqlx::query_scalar::<_, i32>(dimension.lookup_query())
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PipelineError::not_found(dimension.as_str(), value))
    }

    async fn insert_batch(
        &self,
        rows: &[NewEarthquake],
    ) -> Result<Vec<PersistedEarthquake>, PipelineError> {
        let mut tx = self.pool.begin().await?;
        let mut returned: HashMap<String, (i64, DateTime<Utc>)> = HashMap::new();

        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Postgres>::new(queries::INSERT_EARTHQUAKES);
            builder.push_values(chunk, |mut b, row| {
                let event = &row.event;
                b.push_bind(event.event_id.clone())
                    .push_bind(event.occurred_at)
                    .push_bind(event.tsunami)
                    .push_bind(event.felt)
                    .push_bind(event.magnitude)
                    .push_bind(event.cdi)
                    .push_bind(event.latitude)
                    .push_bind(event.longitude)
                    .push_bind(event.depth)
                    .push_bind(event.place.clone())
                    .push_bind(event.detail_url.clone())
                    .push_bind(row.keys.alert_id)
                    .push_bind(row.keys.magnitude_id)
                    .push_bind(row.keys.network_id)
                    .push_bind(row.keys.type_id);
            });
            builder.push(queries::INSERT_EARTHQUAKES_SUFFIX);

            let inserted: Vec<(i64, String, DateTime<Utc>)> =
                builder.build_query_as().fetch_all(&mut *tx).await?;
            debug!("Chunk of {} rows inserted {}", chunk.len(), inserted.len());

            for (earthquake_id, event_id, created_at) in inserted {
                returned.insert(event_id, (earthquake_id, created_at));
            }
        }

        tx.commit().await?;
        info!("Committed {} new earthquakes", returned.len());

        Ok(rows
            .iter()
            .filter_map(|row| {
                returned
                    .remove(&row.event.event_id)
                    .map(|(id, created_at)| PersistedEarthquake::from_new(row.clone(), id, created_at))
            })
            .collect())
    }

    async fn regions_containing(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Region>, PipelineError> {
        let regions = sqlx::query_as::<_, Region>(queries::SELECT_REGIONS_CONTAINING)
            .bind(latitude)
            .bind(longitude)
            .fetch_all(&self.pool)
            .await?;
        Ok(regions)
    }

    async fn topic_target(&self, topic_name: &str) -> Result<String, PipelineError> {
        sqlx::query_scalar::<_, String>(queries::SELECT_TOPIC_ARN)
            .bind(topic_name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PipelineError::not_found("topic", topic_name))
    }
}
