use crate::components::appointment_sync::AppointmentSync;
#[cfg(feature = "webhook")]
use crate::components::edit_webhook::EditWebhook;
use crate::components::google_auth::{AccessTokenSource, TokenManager};
use crate::components::google_calendar::GoogleCalendarClient;
use crate::components::identity::{GoogleIdentity, IdentityProvider, StaticIdentity};
use crate::components::sheets::GoogleSheetsClient;
use crate::components::{ComponentManager, Services};
use crate::config::Config;
use crate::error::{Error, SyncResult};
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the Google-backed collaborators
pub fn build_services(config: &Config) -> SyncResult<Services> {
    let tokens: Arc<dyn AccessTokenSource> = Arc::new(TokenManager::new(config)?);

    let identity: Arc<dyn IdentityProvider> = match &config.acting_user_email {
        Some(email) => Arc::new(StaticIdentity(email.clone())),
        None => Arc::new(GoogleIdentity::new(Arc::clone(&tokens))),
    };

    Ok(Services {
        calendar: Arc::new(GoogleCalendarClient::new(
            &config.google_calendar_id,
            config.tz()?,
            Arc::clone(&tokens),
        )),
        sheets: Arc::new(GoogleSheetsClient::new(
            &config.spreadsheet_id,
            Arc::clone(&tokens),
        )),
        identity,
    })
}

/// Start all components and run until shutdown
pub async fn start_service(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let services = {
        let config_read = config.read().await;
        info!(
            "Syncing calendar {} into sheet {} of {}",
            config_read.google_calendar_id, config_read.sheet_name, config_read.spreadsheet_id
        );
        build_services(&config_read)?
    };

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register appointment sync component
    component_manager.register(AppointmentSync::new());

    // Register edit webhook component
    #[cfg(feature = "webhook")]
    component_manager.register(EditWebhook::new());

    let component_manager = Arc::new(component_manager);
    component_manager.init_all(services).await?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    let _ = shutdown_recv.await;
    info!("Intake sync stopped");

    Ok(())
}
