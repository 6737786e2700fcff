use crate::components::sheets::CellInput;
use crate::utils::time::format_contact_date;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Column B holds the contact date
const CONTACT_DATE_INDEX: usize = 1;

/// Number of columns a contact row fills (A to I)
pub const CONTACT_ROW_WIDTH: usize = 9;

/// One logged appointment, written as a row of the contact sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    /// A: calendar event id, the dedup key
    pub event_id: String,
    /// B
    pub contact_date: DateTime<Utc>,
    /// C
    pub client_name: String,
    /// D
    pub insurance: String,
    /// E
    pub location: String,
    /// F
    pub age: String,
    /// G
    pub guardian_name: String,
    /// H
    pub contact_phone: String,
    /// I
    pub email: String,
}

impl ContactRecord {
    /// Cell values in column order
    pub fn to_row(&self, tz: Tz) -> Vec<String> {
        vec![
            self.event_id.clone(),
            format_contact_date(self.contact_date, tz),
            self.client_name.clone(),
            self.insurance.clone(),
            self.location.clone(),
            self.age.clone(),
            self.guardian_name.clone(),
            self.contact_phone.clone(),
            self.email.clone(),
        ]
    }

    /// Row as written to the sheet. Only the contact date is parsed; every
    /// booker-supplied value is stored verbatim.
    pub fn to_cells(&self, tz: Tz) -> Vec<CellInput> {
        self.to_row(tz)
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                if index == CONTACT_DATE_INDEX {
                    CellInput::Parsed(text)
                } else {
                    CellInput::Raw(text)
                }
            })
            .collect()
    }
}

/// Outcome of one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub logged: usize,
    pub skipped: usize,
}
