//! Polling scheduler
//!
//! Runs the pipeline once immediately and then on a fixed period, committing
//! each result to the snapshot store. Every cycle runs in its own task so a
//! failing or panicking cycle leaves the loop and the stored snapshot alone.

use crate::core::{IndexerError, IndexerResult, SnapshotStore};
use crate::pipeline::{CycleReport, ListingPipeline};
use crate::snapshot::CommitOutcome;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Shortest period the loop will tick at
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Result of one scheduled cycle
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub report: CycleReport,
    /// `None` in dry-run mode
    pub commit: Option<CommitOutcome>,
    pub elapsed: Duration,
}

pub struct PollingScheduler {
    pipeline: Arc<ListingPipeline>,
    store: Arc<dyn SnapshotStore>,
    interval: Duration,
    dry_run: bool,
}

impl PollingScheduler {
    /// Intervals below [`MIN_INTERVAL`] are raised to it
    pub fn new(pipeline: Arc<ListingPipeline>, store: Arc<dyn SnapshotStore>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!("Polling interval {:?} too short, using {:?}", interval, MIN_INTERVAL);
        }
        Self {
            pipeline,
            store,
            interval: interval.max(MIN_INTERVAL),
            dry_run: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Build listings without touching the snapshot
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run_cycle(&self) -> IndexerResult<CycleSummary> {
        let started = Instant::now();

        let pipeline = Arc::clone(&self.pipeline);
        let report = tokio::spawn(async move { pipeline.build_listings().await })
            .await
            .map_err(|e| IndexerError::Task(e.to_string()))??;

        let commit = if self.dry_run {
            None
        } else {
            Some(self.store.commit(&report.listings).await?)
        };

        Ok(CycleSummary {
            report,
            commit,
            elapsed: started.elapsed(),
        })
    }

    /// Poll until the surrounding task is dropped
    pub async fn run(&self) {
        info!("Starting polling scheduler (interval: {:?})", self.interval);

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        loop {
            ticker.tick().await;
            cycle += 1;
            info!("Cycle {} started", cycle);

            match self.run_cycle().await {
                Ok(summary) => log_summary(cycle, &summary),
                Err(e) => error!("Cycle {} failed, keeping previous snapshot: {}", cycle, e),
            }
        }
    }
}

fn log_summary(cycle: u64, summary: &CycleSummary) {
    let report = &summary.report;
    let commit = match &summary.commit {
        None => "dry run, not committed".to_string(),
        Some(CommitOutcome::FirstRun { count }) => format!("first snapshot written ({count})"),
        Some(CommitOutcome::Unchanged { count }) => format!("unchanged ({count})"),
        Some(CommitOutcome::Replaced {
            previous_count,
            count,
            history_file,
        }) => format!(
            "replaced ({previous_count} -> {count}), history {}",
            history_file.display()
        ),
    };

    info!(
        "Cycle {} finished in {:?}: {} managers, {} listings, {} excluded, {} skipped; snapshot {}",
        cycle,
        summary.elapsed,
        report.managers_found,
        report.listings.len(),
        report.excluded.len(),
        report.skipped.len(),
        commit
    );
}
