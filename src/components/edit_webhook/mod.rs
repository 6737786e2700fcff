//! HTTP endpoint receiving spreadsheet edit notifications.

mod routes;

pub use routes::{router, WebhookState};

use super::edit_stamp::EditStampWorkflow;
use super::Services;
use crate::config::Config;
use crate::error::{component_error, SyncResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Webhook server component
#[derive(Default)]
pub struct EditWebhook {
    shutdown_tx: RwLock<Option<oneshot::Sender<()>>>,
    task: RwLock<Option<JoinHandle<()>>>,
}

impl EditWebhook {
    /// Create a new webhook component
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::Component for EditWebhook {
    fn name(&self) -> &'static str {
        "edit_webhook"
    }

    async fn init(&self, config: Arc<RwLock<Config>>, services: Services) -> SyncResult<()> {
        let mut task = self.task.write().await;
        if task.is_some() {
            warn!("Edit webhook is already running, skipping initialization");
            return Ok(());
        }

        let addr = config.read().await.webhook_addr.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| component_error(&format!("Failed to bind webhook to {}: {}", addr, e)))?;

        let state = WebhookState {
            config,
            edits: EditStampWorkflow::new(Arc::clone(&services.sheets), services.identity),
            sheets: services.sheets,
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        *self.shutdown_tx.write().await = Some(shutdown_tx);

        info!("Edit webhook listening on {}", addr);
        *task = Some(tokio::spawn(async move {
            let server = axum::serve(listener, router(state)).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                error!("Edit webhook server error: {}", e);
            }
        }));

        Ok(())
    }

    async fn shutdown(&self) -> SyncResult<()> {
        if let Some(tx) = self.shutdown_tx.write().await.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.write().await.take() {
            if let Err(e) = task.await {
                error!("Edit webhook task failed: {}", e);
            }
        }
        Ok(())
    }
}
