use crate::components::description_parser::FieldLabels;
use crate::error::{config_error, env_error, SyncResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Sheet holding the contact rows and the checkbox column
pub const DEFAULT_SHEET_NAME: &str = "Contacts";
/// Rows reserved for titles above the first data row
pub const DEFAULT_HEADER_ROW: u32 = 4;
/// Column K
pub const DEFAULT_CHECKBOX_COLUMN: u32 = 11;
pub const DEFAULT_USER_ID_COLUMN_OFFSET: u32 = 1;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_WEBHOOK_ADDR: &str = "127.0.0.1:8081";

const COMPONENTS_FILE: &str = "config/components.toml";
const LABELS_FILE: &str = "config/labels.toml";

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Calendar carrying the appointment bookings
    pub google_calendar_id: String,
    /// Spreadsheet the contact rows are written to
    pub spreadsheet_id: String,
    /// Substring identifying the appointment schedule's events
    pub schedule_title: String,
    /// Target sheet, also the sheet monitored for checkbox edits
    pub sheet_name: String,
    /// Number of title rows above the data
    pub header_row: u32,
    /// 1-based column of the status checkbox
    pub checkbox_column: u32,
    /// Distance from the checkbox to the stamp cell
    pub user_id_column_offset: u32,
    /// Seconds between sync runs
    pub sync_interval_secs: u64,
    /// IANA timezone used to render dates
    pub timezone: String,
    /// Redis holding the OAuth token
    pub redis_url: String,
    /// Bind address of the edit webhook
    pub webhook_addr: String,
    /// Bearer secret required by the webhook, if any
    pub webhook_secret: Option<String>,
    /// Fixed identity used for stamps instead of the OAuth account
    pub acting_user_email: Option<String>,
    /// Bold labels of the booking form fields
    pub labels: FieldLabels,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_calendar_id: String::new(),
            spreadsheet_id: String::new(),
            schedule_title: String::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header_row: DEFAULT_HEADER_ROW,
            checkbox_column: DEFAULT_CHECKBOX_COLUMN,
            user_id_column_offset: DEFAULT_USER_ID_COLUMN_OFFSET,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            timezone: "UTC".to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            webhook_addr: DEFAULT_WEBHOOK_ADDR.to_string(),
            webhook_secret: None,
            acting_user_email: None,
            labels: FieldLabels::default(),
            components: default_components(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_vars(|key| env::var(key).ok())?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            let file_components = toml::from_str::<HashMap<String, bool>>(&content)?;
            for (key, value) in file_components {
                config.components.insert(key, value);
            }
        }

        if let Ok(content) = fs::read_to_string(LABELS_FILE) {
            config.labels = toml::from_str::<FieldLabels>(&content)?;
        }

        Ok(config)
    }

    /// Build configuration from a variable lookup
    pub fn from_vars<F>(var: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| var(key).filter(|v| !v.is_empty()).ok_or_else(|| env_error(key));

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let google_calendar_id = required("GOOGLE_CALENDAR_ID")?;
        let spreadsheet_id = required("SPREADSHEET_ID")?;
        let schedule_title = required("SCHEDULE_TITLE")?;

        let header_row = parse_number(&var, "HEADER_ROW", DEFAULT_HEADER_ROW)?;
        if header_row == 0 {
            return Err(config_error("HEADER_ROW must be at least 1"));
        }
        let checkbox_column = parse_number(&var, "CHECKBOX_COLUMN", DEFAULT_CHECKBOX_COLUMN)?;
        if checkbox_column == 0 {
            return Err(config_error("CHECKBOX_COLUMN must be at least 1"));
        }
        let user_id_column_offset =
            parse_number(&var, "USER_ID_COLUMN_OFFSET", DEFAULT_USER_ID_COLUMN_OFFSET)?;
        let sync_interval_secs =
            parse_number(&var, "SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS)?;

        let timezone = var("TIMEZONE").unwrap_or_else(|| String::from("UTC"));
        timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone)))?;

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            spreadsheet_id,
            schedule_title,
            sheet_name: var("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            header_row,
            checkbox_column,
            user_id_column_offset,
            sync_interval_secs,
            timezone,
            redis_url: var("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            webhook_addr: var("WEBHOOK_ADDR").unwrap_or_else(|| DEFAULT_WEBHOOK_ADDR.to_string()),
            webhook_secret: var("WEBHOOK_SECRET").filter(|v| !v.is_empty()),
            acting_user_email: var("ACTING_USER_EMAIL").filter(|v| !v.is_empty()),
            labels: FieldLabels::default(),
            components: default_components(),
        })
    }

    /// Parsed timezone, validated at load time
    pub fn tz(&self) -> SyncResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Row where new contacts are inserted
    pub fn first_data_row(&self) -> u32 {
        self.header_row + 1
    }

    /// Column receiving the edit stamp
    pub fn stamp_column(&self) -> u32 {
        self.checkbox_column + self.user_id_column_offset
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert("appointment_sync".to_string(), true);
    components.insert("edit_webhook".to_string(), true);
    components
}

fn parse_number<F, T>(var: &F, key: &str, default: T) -> SyncResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| config_error(&format!("Invalid {} format: {}", key, raw))),
        None => Ok(default),
    }
}
