//! Google Calendar access: the event model and the REST client.

pub mod client;
pub mod models;

pub use client::{CalendarSource, GoogleCalendarClient};
pub use models::CalendarEvent;
