mod filter;
pub mod models;
mod scheduler;
mod workflow;

pub use filter::{EventFilter, SkipReason};
pub use models::{ContactRecord, SyncReport};
pub use workflow::{build_record, SyncWorkflow};

use super::Services;
use crate::config::Config;
use crate::error::SyncResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Periodically logs booked appointments into the contact sheet
#[derive(Default)]
pub struct AppointmentSync {
    task: RwLock<Option<JoinHandle<()>>>,
}

impl AppointmentSync {
    /// Create a new appointment sync component
    pub fn new() -> Self {
        Self {
            task: RwLock::new(None),
        }
    }
}

#[async_trait]
impl super::Component for AppointmentSync {
    fn name(&self) -> &'static str {
        "appointment_sync"
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> SyncResult<()> {
        let mut task = self.task.write().await;
        if task.is_some() {
            warn!("Appointment sync is already running, skipping initialization");
            return Ok(());
        }

        let workflow = SyncWorkflow::new(services.calendar, services.sheets);
        *task = Some(tokio::spawn(scheduler::run_sync_loop(config, workflow)));
        info!("Appointment sync scheduler started");

        Ok(())
    }

    async fn shutdown(&self) -> SyncResult<()> {
        if let Some(task) = self.task.write().await.take() {
            task.abort();
        }
        Ok(())
    }
}
