mod config;
mod db;
mod error;
mod feed;
mod kafka;
mod models;
mod processor;
mod publisher;
mod scheduler;
#[cfg(test)]
mod testing;

use config::AppConfig;
use db::store::PgStore;
use feed::HttpFeedClient;
use kafka::KafkaPublisher;
use processor::pipeline::{Pipeline, RunStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Quake Alerts pipeline...");

    // Init DB
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    info!("Connected to database");
    if config.run_migrations {
        db::migrate(&pool).await?;
        info!("Migrations applied");
    }

    let feed = HttpFeedClient::new(
        &config.feed_url,
        Duration::from_secs(config.feed_timeout_secs),
    )?;
    let publisher = KafkaPublisher::new(&config)?;
    let mut pipeline = Pipeline::new(
        Arc::new(feed),
        Arc::new(PgStore::new(pool)),
        Arc::new(publisher),
    );

    if config.run_once {
        let report = pipeline
            .run_with_timeout(Duration::from_secs(config.run_timeout_secs))
            .await;
        println!("{}", serde_json::to_string(&report)?);
        if report.status == RunStatus::Error {
            anyhow::bail!(report.detail.unwrap_or_else(|| "pipeline run failed".to_string()));
        }
        return Ok(());
    }

    scheduler::run_schedule(&config, pipeline).await
}
