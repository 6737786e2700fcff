#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use intake_sync::components::google_calendar::{CalendarEvent, CalendarSource};
use intake_sync::components::identity::IdentityProvider;
use intake_sync::components::sheets::{CellInput, CellRef, SheetStore};
use intake_sync::config::Config;
use intake_sync::error::{sheets_error, SyncResult};
use std::collections::HashMap;
use std::sync::Mutex;

pub const SCHEDULE_TITLE: &str = "ABA Intake Call";

/// Config pointing at the mock sheet
pub fn test_config() -> Config {
    Config {
        google_calendar_id: "intake@example.org".to_string(),
        spreadsheet_id: "sheet-1".to_string(),
        schedule_title: SCHEDULE_TITLE.to_string(),
        ..Config::default()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 20, 16, 30, 0).unwrap()
}

pub fn booking(id: &str, description: &str, guests: &[&str]) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: format!("Jane Doe and Intake Team: {}", SCHEDULE_TITLE),
        start_time: start_time(),
        description: Some(description.to_string()),
        guests: guests.iter().map(|g| g.to_string()).collect(),
    }
}

/// Mock calendar returning a fixed list of events
#[derive(Default)]
pub struct MockCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    pub requested: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl MockCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn set_events(&self, events: Vec<CalendarEvent>) {
        *self.events.lock().unwrap() = events;
    }
}

#[async_trait]
impl CalendarSource for MockCalendar {
    async fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SyncResult<Vec<CalendarEvent>> {
        self.requested.lock().unwrap().push((start, end));
        Ok(self.events.lock().unwrap().clone())
    }
}

/// In-memory spreadsheet with 1-based rows and columns
#[derive(Default)]
pub struct MockSheet {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    /// Number of successful row inserts after which inserts fail
    fail_inserts_after: Mutex<Option<usize>>,
    inserts: Mutex<usize>,
    /// Cells written with parsing enabled
    parsed_cells: Mutex<Vec<CellRef>>,
}

impl MockSheet {
    /// Sheet with `header_rows` title rows
    pub fn with_sheet(name: &str, header_rows: u32) -> Self {
        let mock = Self::default();
        let rows = (1..=header_rows)
            .map(|i| vec![format!("Header {}", i)])
            .collect();
        mock.sheets.lock().unwrap().insert(name.to_string(), rows);
        mock
    }

    pub fn fail_inserts_after(&self, count: usize) {
        *self.fail_inserts_after.lock().unwrap() = Some(count);
    }

    pub fn clear_failures(&self) {
        *self.fail_inserts_after.lock().unwrap() = None;
    }

    pub fn parsed_cells(&self) -> Vec<CellRef> {
        self.parsed_cells.lock().unwrap().clone()
    }

    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap()
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }

    pub fn cell(&self, sheet: &str, cell: CellRef) -> String {
        self.rows(sheet)
            .get(cell.row as usize - 1)
            .and_then(|row| row.get(cell.column as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_cell(&self, sheet: &str, cell: CellRef, value: &str) {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets.entry(sheet.to_string()).or_default();
        set(rows, cell, value);
    }
}

fn set(rows: &mut Vec<Vec<String>>, cell: CellRef, value: &str) {
    let (r, c) = (cell.row as usize - 1, cell.column as usize - 1);
    if rows.len() <= r {
        rows.resize(r + 1, Vec::new());
    }
    if rows[r].len() <= c {
        rows[r].resize(c + 1, String::new());
    }
    rows[r][c] = value.to_string();
}

#[async_trait]
impl SheetStore for MockSheet {
    async fn has_sheet(&self, sheet: &str) -> SyncResult<bool> {
        Ok(self.sheets.lock().unwrap().contains_key(sheet))
    }

    async fn read_column(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
    ) -> SyncResult<Vec<String>> {
        let rows = self.rows(sheet);
        Ok(rows
            .iter()
            .skip(first_row as usize - 1)
            .map(|row| row.get(column as usize - 1).cloned().unwrap_or_default())
            .collect())
    }

    async fn insert_row_before(&self, sheet: &str, row: u32) -> SyncResult<()> {
        let mut inserts = self.inserts.lock().unwrap();
        if let Some(limit) = *self.fail_inserts_after.lock().unwrap() {
            if *inserts >= limit {
                return Err(sheets_error("quota exceeded"));
            }
        }

        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| sheets_error(&format!("Sheet not found: {}", sheet)))?;
        let index = row as usize - 1;
        if rows.len() < index {
            rows.resize(index, Vec::new());
        }
        rows.insert(index, Vec::new());
        *inserts += 1;
        Ok(())
    }

    async fn write_row(&self, sheet: &str, row: u32, values: &[CellInput]) -> SyncResult<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| sheets_error(&format!("Sheet not found: {}", sheet)))?;
        for (i, value) in values.iter().enumerate() {
            let cell = CellRef::new(row, i as u32 + 1);
            set(rows, cell, value.text());
            if value.is_parsed() {
                self.parsed_cells.lock().unwrap().push(cell);
            }
        }
        Ok(())
    }

    async fn write_cell(&self, sheet: &str, cell: CellRef, value: &str) -> SyncResult<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| sheets_error(&format!("Sheet not found: {}", sheet)))?;
        set(rows, cell, value);
        Ok(())
    }

    async fn clear_cell(&self, sheet: &str, cell: CellRef) -> SyncResult<()> {
        self.write_cell(sheet, cell, "").await
    }
}

/// Identity returning a fixed address
pub struct MockIdentity(pub &'static str);

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn active_user_email(&self) -> SyncResult<String> {
        Ok(self.0.to_string())
    }
}
