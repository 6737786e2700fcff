//! Google Sheets access for the contact sheet.

pub mod client;
pub mod models;

pub use client::{GoogleSheetsClient, SheetStore};
pub use models::{CellInput, CellRef};
