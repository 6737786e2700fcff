//! Blank row at the top of the contact list for contacts entered by hand.

use crate::components::sheets::SheetStore;
use crate::config::Config;
use crate::error::SyncResult;
use tracing::{error, info};

/// Insert a blank row as the first data row.
///
/// Returns `false` without touching anything when the sheet does not exist.
pub async fn insert_manual_contact_row(store: &dyn SheetStore, config: &Config) -> SyncResult<bool> {
    if !store.has_sheet(&config.sheet_name).await? {
        error!("Sheet named \"{}\" not found", config.sheet_name);
        return Ok(false);
    }

    let row = config.first_data_row();
    store.insert_row_before(&config.sheet_name, row).await?;
    info!("Inserted new blank row at row {} in {}", row, config.sheet_name);

    Ok(true)
}
