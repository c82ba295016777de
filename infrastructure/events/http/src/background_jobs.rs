use std::time::Instant;

use events_query_handlers::{PageRefresher, RefreshJob};
use flume::Receiver;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Drains the refresh queue, recomputing one cached page per job.
pub struct RefreshWorker {
    refresher: PageRefresher,
    jobs: Receiver<RefreshJob>,
}

impl RefreshWorker {
    pub fn new(refresher: PageRefresher, jobs: Receiver<RefreshJob>) -> Self {
        Self { refresher, jobs }
    }

    /// Runs until every dispatcher has been dropped.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Starting cached page refresh worker");

            while let Ok(job) = self.jobs.recv_async().await {
                let started = Instant::now();
                match self.refresher.refresh(&job).await {
                    Ok(()) => {
                        info!("Refreshed {} in {:?}", job.key, started.elapsed());
                    }
                    Err(e) => {
                        error!("Failed to refresh {}: {}", job.key, e);
                    }
                }
            }

            info!("Refresh queue closed, worker stopping");
        })
    }
}
