use intake_sync::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting intake sync");

    // Load configuration
    let config = startup::load_config().await?;

    // Run until a termination signal arrives
    startup::start_service(config).await
}
