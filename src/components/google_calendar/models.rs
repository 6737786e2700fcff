use chrono::{DateTime, Utc};

/// Calendar event as seen by the sync workflow
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalendarEvent {
    /// Stable event id, the dedup key of the contact sheet
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    /// Raw description with `<br>` and `<b>` markup
    pub description: Option<String>,
    /// Guest emails in calendar order, owner excluded
    pub guests: Vec<String>,
}
