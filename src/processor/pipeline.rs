use crate::db::store::Store;
use crate::error::PipelineError;
use crate::feed::FeedClient;
use crate::models::earthquake::PersistedEarthquake;
use crate::processor::notify::{self, NotifySummary};
use crate::processor::{extract, load, transform};
use crate::publisher::Publisher;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Where a run currently is; `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Extracting,
    Transforming,
    Loading,
    Notifying,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    NoData,
    Error,
}

/// Outcome of one pipeline run, as reported to the scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub inserted: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub duplicates: usize,
    pub published: usize,
    pub publish_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip)]
    pub retryable: bool,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            status: RunStatus::Ok,
            inserted: 0,
            skipped: 0,
            invalid: 0,
            duplicates: 0,
            published: 0,
            publish_failures: 0,
            failed_stage: None,
            detail: None,
            retryable: false,
        }
    }
}

/// Extract → transform → load → notify, with the collaborators injected.
pub struct Pipeline {
    feed: Arc<dyn FeedClient>,
    store: Arc<dyn Store>,
    publisher: Arc<dyn Publisher>,
    stage: Stage,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn FeedClient>,
        store: Arc<dyn Store>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            feed,
            store,
            publisher,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Runs once against the current clock.
    pub async fn run_with_timeout(&mut self, limit: Duration) -> RunReport {
        self.run_at(Utc::now(), limit).await
    }

    /// Runs once, judging the feed window against `now`.
    ///
    /// Extracting, transforming and loading share `limit`; running out of it
    /// drops the open load transaction, so nothing is committed. Once the load
    /// has committed, each earthquake gets its own `limit` to notify in, and a
    /// notification that runs out of it is counted as a publish failure.
    pub async fn run_at(&mut self, now: DateTime<Utc>, limit: Duration) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id);
        self.execute(run_id, now, limit).instrument(span).await
    }

    async fn execute(&mut self, run_id: Uuid, now: DateTime<Utc>, limit: Duration) -> RunReport {
        self.stage = Stage::Idle;
        let mut report = RunReport::new(run_id);

        let persisted = match tokio::time::timeout(limit, self.ingest(now, &mut report)).await {
            Ok(Ok(Some(persisted))) => persisted,
            Ok(Ok(None)) => return report,
            Ok(Err(e)) => return self.fail(report, e),
            Err(_) => return self.fail(report, PipelineError::Timeout(limit)),
        };

        self.transition(Stage::Notifying);
        let summary = self.notify_all(&persisted, limit).await;
        report.published = summary.published;
        report.publish_failures = summary.failed;

        self.transition(Stage::Done);
        info!(
            "Pipeline run finished: {} inserted, {} skipped, {} published",
            report.inserted, report.skipped, report.published
        );
        report
    }

    /// Extract, transform and load. `None` means the feed had nothing new.
    async fn ingest(
        &mut self,
        now: DateTime<Utc>,
        report: &mut RunReport,
    ) -> Result<Option<Vec<PersistedEarthquake>>, PipelineError> {
        self.transition(Stage::Extracting);
        let raw = extract::fetch_recent_at(self.feed.as_ref(), now).await?;
        if raw.is_empty() {
            self.transition(Stage::Done);
            report.status = RunStatus::NoData;
            report.detail = Some("No new earthquake data".to_string());
            return Ok(None);
        }

        self.transition(Stage::Transforming);
        let cleaned = transform::clean(&raw)?;
        report.invalid = raw.len() - cleaned.len();

        self.transition(Stage::Loading);
        let outcome = load::load(self.store.as_ref(), &cleaned).await?;
        report.inserted = outcome.summary.inserted_count;
        report.skipped = outcome.summary.skipped_count;
        report.duplicates = outcome.summary.duplicate_count;
        Ok(Some(outcome.persisted))
    }

    async fn notify_all(&self, quakes: &[PersistedEarthquake], limit: Duration) -> NotifySummary {
        let store = self.store.as_ref();
        let publisher = self.publisher.as_ref();
        let results = join_all(quakes.iter().map(|quake| {
            tokio::time::timeout(limit, notify::notify(store, publisher, quake))
        }))
        .await;

        let mut total = NotifySummary::default();
        for (quake, result) in quakes.iter().zip(results) {
            match result {
                Ok(Ok(summary)) => total += summary,
                Ok(Err(e)) => {
                    warn!(
                        "Could not notify subscribers of earthquake {}: {}",
                        quake.earthquake_id, e
                    );
                    total.failed += 1;
                }
                Err(_) => {
                    warn!(
                        "Notifying subscribers of earthquake {} timed out after {:?}",
                        quake.earthquake_id, limit
                    );
                    total.failed += 1;
                }
            }
        }
        total
    }

    fn transition(&mut self, next: Stage) {
        info!("Pipeline stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn fail(&mut self, mut report: RunReport, e: PipelineError) -> RunReport {
        error!("Pipeline run failed during {:?}: {}", self.stage, e);
        report.failed_stage = Some(self.stage);
        self.stage = Stage::Failed;
        report.status = RunStatus::Error;
        report.retryable = e.is_retryable();
        report.detail = Some(e.to_string());
        report
    }
}
