use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// How far back a sync run looks, to catch bookings made since the last run
pub const SYNC_LOOKBACK_HOURS: i64 = 1;
/// How far ahead a sync run looks
pub const SYNC_LOOKAHEAD_DAYS: i64 = 30;

/// Window of events checked by a sync run started at `now`
pub fn sync_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        now - Duration::hours(SYNC_LOOKBACK_HOURS),
        now + Duration::days(SYNC_LOOKAHEAD_DAYS),
    )
}

/// Contact date as written to the sheet, which parses it as a date-time
pub fn format_contact_date(start: DateTime<Utc>, tz: Tz) -> String {
    start.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Timestamp part of an edit stamp
pub fn format_stamp_time(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz)
        .format("%a %b %d %Y %H:%M:%S GMT%z")
        .to_string()
}
