use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

use super::workflow::SyncWorkflow;
use crate::config::Config;

/// Run the sync workflow now and then every configured interval, one run at a time
pub async fn run_sync_loop(config: Arc<RwLock<Config>>, workflow: SyncWorkflow) {
    loop {
        // Snapshot per run
        let snapshot = config.read().await.clone();
        let interval = TokioDuration::from_secs(snapshot.sync_interval_secs.max(1));

        match workflow.run(&snapshot, Utc::now()).await {
            Ok(report) => info!(
                "Sync finished: {} fetched, {} logged, {} skipped",
                report.fetched, report.logged, report.skipped
            ),
            Err(e) => error!("Sync run failed, retrying next interval: {}", e),
        }

        sleep(interval).await;
    }
}
