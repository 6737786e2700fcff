use super::models::CalendarEvent;
use crate::components::google_auth::AccessTokenSource;
use crate::error::{google_calendar_error, SyncResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "250";

/// Source of calendar events
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// All events overlapping `[start, end]`, in calendar order
    async fn events(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> SyncResult<Vec<CalendarEvent>>;
}

/// Google Calendar v3 REST client
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    calendar_id: String,
    timezone: Tz,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: &str, timezone: Tz, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self::with_base_url(GOOGLE_CALENDAR_API, calendar_id, timezone, tokens)
    }

    /// Client against a different API root
    pub fn with_base_url(
        base_url: &str,
        calendar_id: &str,
        timezone: Tz,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            timezone,
            tokens,
        }
    }

    fn events_url(&self) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> SyncResult<Value> {
        let mut url = self.events_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeMin", &start.to_rfc3339());
            query.append_pair("timeMax", &end.to_rfc3339());
            query.append_pair("singleEvents", "true");
            query.append_pair("orderBy", "startTime");
            query.append_pair("maxResults", PAGE_SIZE);
            if let Some(page_token) = page_token {
                query.append_pair("pageToken", page_token);
            }
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>> {
        let access_token = self.tokens.access_token().await?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_page(&access_token, start, end, page_token.as_deref())
                .await?;

            let items = page
                .get("items")
                .and_then(|i| i.as_array())
                .ok_or_else(|| google_calendar_error("No items in response"))?;

            for item in items {
                match parse_event(item, self.timezone) {
                    Some(event) => events.push(event),
                    None => warn!(
                        "Skipping calendar item without id or start: {}",
                        item.get("id").and_then(|v| v.as_str()).unwrap_or("<no id>")
                    ),
                }
            }

            page_token = page
                .get("nextPageToken")
                .and_then(|t| t.as_str())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
            debug!("Fetching next calendar page");
        }

        Ok(events)
    }
}

/// Convert one API item; all-day events start at local midnight
fn parse_event(item: &Value, timezone: Tz) -> Option<CalendarEvent> {
    let id = item.get("id").and_then(|v| v.as_str())?.to_string();
    let title = item
        .get("summary")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let description = item
        .get("description")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let start = item.get("start")?;
    let start_time = if let Some(date_time) = start.get("dateTime").and_then(|v| v.as_str()) {
        DateTime::parse_from_rfc3339(date_time)
            .ok()?
            .with_timezone(&Utc)
    } else {
        let date = start.get("date").and_then(|v| v.as_str())?;
        let midnight = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?;
        timezone
            .from_local_datetime(&midnight)
            .earliest()?
            .with_timezone(&Utc)
    };

    let guests = item
        .get("attendees")
        .and_then(|a| a.as_array())
        .map(|attendees| {
            attendees
                .iter()
                .filter(|a| !flag(a, "self") && !flag(a, "organizer"))
                .filter_map(|a| a.get("email").and_then(|e| e.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(CalendarEvent {
        id,
        title,
        start_time,
        description,
        guests,
    })
}

fn flag(attendee: &Value, name: &str) -> bool {
    attendee.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
}
