use crate::config::AppConfig;
use crate::processor::pipeline::{Pipeline, RunReport, RunStatus};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Runs the pipeline on a fixed interval until Ctrl-C, one run at a time.
///
/// Consecutive failed runs trip a circuit breaker that pauses the schedule.
pub async fn run_schedule(config: &AppConfig, mut pipeline: Pipeline) -> anyhow::Result<()> {
    let run_timeout = Duration::from_secs(config.run_timeout_secs);
    let cooldown_duration = Duration::from_secs(config.circuit_breaker_cooldown);
    let max_failures = config.max_consecutive_failures;

    let mut interval = tokio::time::interval(Duration::from_secs(config.run_interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut consecutive_failures = 0;

    info!(
        "Scheduling pipeline every {}s (timeout {}s)",
        config.run_interval_secs, config.run_timeout_secs
    );

    loop {
        // Circuit Breaker Check
        if consecutive_failures >= max_failures {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.circuit_breaker_cooldown
            );
            tokio::select! {
                _ = tokio::time::sleep(cooldown_duration) => {}
                _ = tokio::signal::ctrl_c() => break,
            }
            consecutive_failures = 0;
            interval.reset();
            info!("Circuit breaker reset. Resuming schedule.");
        }

        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let report = pipeline.run_with_timeout(run_timeout).await;
        log_report(&report);
        debug!("Pipeline settled in {:?}", pipeline.stage());

        if report.status == RunStatus::Error {
            consecutive_failures += 1;
            error!(
                "Pipeline run failed in {:?} ({} / {}), retryable: {}",
                report.failed_stage,
                consecutive_failures,
                max_failures,
                report.retryable
            );
        } else {
            consecutive_failures = 0;
        }
    }

    info!("Shutdown requested, stopping schedule");
    Ok(())
}

pub fn log_report(report: &RunReport) {
    match serde_json::to_string(report) {
        Ok(json) => info!("Run result: {}", json),
        Err(e) => warn!("Could not serialize run result: {}", e),
    }
}
