use crate::components::google_calendar::CalendarEvent;
use std::collections::HashSet;
use std::fmt;

/// Why an event is not logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyLogged,
    TitleMismatch,
    NoGuests,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyLogged => write!(f, "already logged"),
            SkipReason::TitleMismatch => write!(f, "title does not match schedule"),
            SkipReason::NoGuests => write!(f, "no guests"),
        }
    }
}

/// Decides which calendar events belong in the contact sheet
#[derive(Debug, Clone, Copy)]
pub struct EventFilter<'a> {
    schedule_title: &'a str,
}

impl<'a> EventFilter<'a> {
    pub fn new(schedule_title: &'a str) -> Self {
        Self { schedule_title }
    }

    /// First failing check, in dedup, title, guests order
    pub fn check(&self, event: &CalendarEvent, logged_ids: &HashSet<String>) -> Result<(), SkipReason> {
        if logged_ids.contains(&event.id) {
            return Err(SkipReason::AlreadyLogged);
        }
        if !event.title.contains(self.schedule_title) {
            return Err(SkipReason::TitleMismatch);
        }
        if event.guests.is_empty() {
            return Err(SkipReason::NoGuests);
        }
        Ok(())
    }

    pub fn should_process(&self, event: &CalendarEvent, logged_ids: &HashSet<String>) -> bool {
        self.check(event, logged_ids).is_ok()
    }
}
