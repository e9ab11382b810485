use std::sync::Arc;
use std::time::Duration;

use cf_core::{ArticleStorage, NewsSource, Result};
use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::reconciler::{reconcile, CycleReport};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runs fetch-then-reconcile cycles. At most one cycle is in flight at a time.
#[derive(Clone)]
pub struct Ingestor {
    source: Arc<dyn NewsSource>,
    storage: Arc<dyn ArticleStorage>,
    in_flight: Arc<Mutex<()>>,
}

impl Ingestor {
    pub fn new(source: Arc<dyn NewsSource>, storage: Arc<dyn ArticleStorage>) -> Self {
        Self {
            source,
            storage,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Runs one cycle now.
    ///
    /// Returns `Ok(None)` without fetching when another cycle is still running.
    /// A failed fetch aborts the cycle before anything is written.
    pub async fn run_cycle(&self) -> Result<Option<CycleReport>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Ok(None);
        };

        let fetched_at = Utc::now();
        info!(source = self.source.name(), "🔄 Starting ingestion cycle");
        let batch = self.source.fetch().await?;
        let report = reconcile(self.storage.as_ref(), &batch, fetched_at).await;

        info!(
            inserted = report.inserted,
            fetched = report.fetched,
            skipped = report.skipped,
            failed = report.failed,
            "✨ Inserted {} new unique articles at {}",
            report.inserted,
            fetched_at.to_rfc3339()
        );
        Ok(Some(report))
    }

    async fn run_scheduled_cycle(&self) {
        match self.run_cycle().await {
            Ok(Some(_)) => {}
            Ok(None) => warn!("⏭️ Previous ingestion cycle still running, skipping this one"),
            Err(e) => error!(error = %e, "❌ Error fetching or storing news"),
        }
    }

    /// Starts the background schedule: one cycle immediately, then one every
    /// `interval` until the returned handle is shut down or dropped.
    ///
    /// Panics if `interval` is zero.
    pub fn spawn(self, interval: Duration) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // Cycles run beside the ticker so it keeps time while one is in flight.
            let mut cycles = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    Some(_) = cycles.join_next(), if !cycles.is_empty() => continue,
                    _ = shutdown_rx.changed() => break,
                }

                let ingestor = self.clone();
                cycles.spawn(async move { ingestor.run_scheduled_cycle().await });
            }

            let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
                while cycles.join_next().await.is_some() {}
            })
            .await;
            if drained.is_err() {
                warn!(grace_secs = SHUTDOWN_GRACE.as_secs(), "⚠️ Ingestion cycle still running at shutdown, aborting it");
                cycles.shutdown().await;
            }
        });

        info!(interval_secs = interval.as_secs(), "⏰ Ingestion scheduler started");
        SchedulerHandle { shutdown_tx, task }
    }
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops scheduling new cycles and waits for the one in flight, if any.
    /// A cycle still running after [`SHUTDOWN_GRACE`] is aborted.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Ingestion scheduler task failed");
        }
        info!("🛑 Ingestion scheduler stopped");
    }
}
