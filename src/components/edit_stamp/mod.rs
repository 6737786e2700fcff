//! Stamps who checked a contact's status checkbox, and when.

use crate::components::identity::IdentityProvider;
use crate::components::sheets::{CellRef, SheetStore};
use crate::config::Config;
use crate::error::SyncResult;
use crate::utils::time::format_stamp_time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Cell value of a ticked checkbox
pub const CHECKED: &str = "TRUE";

/// A single-cell edit reported by the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditNotification {
    /// Sheet the edit happened on
    pub sheet: String,
    /// Edited cell; notifications without one are ignored
    pub range: Option<CellRef>,
    /// New cell value, absent when the cell was cleared
    #[serde(default)]
    pub value: Option<String>,
    /// Editor's email when the sender knows it
    #[serde(default)]
    pub user: Option<String>,
}

/// What an edit notification caused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    Ignored,
    Stamped { cell: CellRef, stamp: String },
    Cleared { cell: CellRef },
}

#[derive(Clone)]
pub struct EditStampWorkflow {
    store: Arc<dyn SheetStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl EditStampWorkflow {
    pub fn new(store: Arc<dyn SheetStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// React to a cell edit.
    ///
    /// Only edits of the checkbox column on the monitored sheet matter: a
    /// checked box gets `"<user> @ <time>"` next to it, anything else clears
    /// that cell. The user is the editor named in the notification, else the
    /// identity provider's account.
    pub async fn on_edit(
        &self,
        config: &Config,
        notification: Option<&EditNotification>,
        now: DateTime<Utc>,
    ) -> SyncResult<EditOutcome> {
        let (notification, edited) = match notification {
            Some(n) => match n.range {
                Some(range) => (n, range),
                None => {
                    info!("Edit notification without a target cell");
                    return Ok(EditOutcome::Ignored);
                }
            },
            None => {
                info!("Edit handler triggered without a notification");
                return Ok(EditOutcome::Ignored);
            }
        };

        debug!(
            "Edit on {} row {}, col {}, value {:?}",
            notification.sheet, edited.row, edited.column, notification.value
        );

        if notification.sheet != config.sheet_name || edited.column != config.checkbox_column {
            return Ok(EditOutcome::Ignored);
        }

        let target = edited.right(config.user_id_column_offset);

        if notification.value.as_deref() == Some(CHECKED) {
            let user = match notification.user.as_deref().map(str::trim) {
                Some(editor) if !editor.is_empty() => editor.to_string(),
                _ => self.identity.active_user_email().await?,
            };
            let stamp = format!("{} @ {}", user, format_stamp_time(now, config.tz()?));
            self.store
                .write_cell(&config.sheet_name, target, &stamp)
                .await?;
            info!(
                "Logged user {} in row {}, column {}",
                user, target.row, target.column
            );
            Ok(EditOutcome::Stamped {
                cell: target,
                stamp,
            })
        } else {
            self.store.clear_cell(&config.sheet_name, target).await?;
            info!(
                "Cleared user ID in row {}, column {}",
                target.row, target.column
            );
            Ok(EditOutcome::Cleared { cell: target })
        }
    }
}
