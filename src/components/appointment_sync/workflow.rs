use super::filter::EventFilter;
use super::models::{ContactRecord, SyncReport};
use crate::components::description_parser::{parse_description, ContactDetails};
use crate::components::google_calendar::{CalendarEvent, CalendarSource};
use crate::components::sheets::SheetStore;
use crate::config::Config;
use crate::error::SyncResult;
use crate::utils::time::sync_window;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Dedup key column (A)
const EVENT_ID_COLUMN: u32 = 1;

/// Copies newly booked appointments from the calendar into the contact sheet
#[derive(Clone)]
pub struct SyncWorkflow {
    calendar: Arc<dyn CalendarSource>,
    store: Arc<dyn SheetStore>,
}

impl SyncWorkflow {
    pub fn new(calendar: Arc<dyn CalendarSource>, store: Arc<dyn SheetStore>) -> Self {
        Self { calendar, store }
    }

    /// Log every qualifying event in the window around `now`.
    ///
    /// Each row is inserted on its own; an error aborts the run and leaves
    /// rows written so far in place. Unlogged events are picked up next run.
    pub async fn run(&self, config: &Config, now: DateTime<Utc>) -> SyncResult<SyncReport> {
        let tz = config.tz()?;
        let (start, end) = sync_window(now);

        let events = self.calendar.events(start, end).await?;
        info!("Total events found in range: {}", events.len());

        let mut logged_ids = self.logged_ids(config).await?;
        let filter = EventFilter::new(&config.schedule_title);
        let mut report = SyncReport {
            fetched: events.len(),
            ..SyncReport::default()
        };

        for event in &events {
            debug!("Checking event: {} (ID: {})", event.title, event.id);

            if let Err(reason) = filter.check(event, &logged_ids) {
                debug!("Skipped {}: {}", event.id, reason);
                report.skipped += 1;
                continue;
            }

            debug!(
                "Event {} has {} guests: {:?}",
                event.id,
                event.guests.len(),
                event.guests
            );

            let details = parse_description(event.description.as_deref(), &config.labels);
            debug!("Parsed description fields: {:?}", details.fields);

            let record = build_record(event, &details);
            let row = record.to_cells(tz);
            debug!("New row: {:?}", row);

            let insert_at = config.first_data_row();
            self.store
                .insert_row_before(&config.sheet_name, insert_at)
                .await?;
            self.store
                .write_row(&config.sheet_name, insert_at, &row)
                .await?;

            info!("Logged new appointment for: {}", record.guardian_name);
            logged_ids.insert(record.event_id);
            report.logged += 1;
        }

        Ok(report)
    }

    /// Event ids already present below the header
    async fn logged_ids(&self, config: &Config) -> SyncResult<HashSet<String>> {
        let ids = self
            .store
            .read_column(&config.sheet_name, EVENT_ID_COLUMN, config.first_data_row())
            .await?;

        Ok(ids.into_iter().filter(|id| !id.is_empty()).collect())
    }
}

/// Combine an event with its parsed description.
///
/// The contact phone is the one from the "Booked by" block; the email is the
/// first guest's address when the event has one.
pub fn build_record(event: &CalendarEvent, details: &ContactDetails) -> ContactRecord {
    let email = event
        .guests
        .first()
        .filter(|guest| !guest.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| details.email.clone());

    ContactRecord {
        event_id: event.id.clone(),
        contact_date: event.start_time,
        client_name: details.fields.client_name.clone(),
        insurance: details.fields.insurance.clone(),
        location: details.fields.location.clone(),
        age: details.fields.age.clone(),
        guardian_name: details.guardian_name(),
        contact_phone: details.phone.clone(),
        email,
    }
}
