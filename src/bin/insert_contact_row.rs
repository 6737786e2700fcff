use intake_sync::components::manual_entry::insert_manual_contact_row;
use intake_sync::startup;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    let config = startup::load_config().await?;
    let config = config.read().await.clone();
    let services = startup::build_services(&config)?;

    if insert_manual_contact_row(services.sheets.as_ref(), &config).await? {
        info!("Blank contact row ready at row {}", config.first_data_row());
    } else {
        warn!("No row inserted");
    }

    Ok(())
}
