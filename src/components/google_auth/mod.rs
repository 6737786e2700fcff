//! OAuth access for the Google APIs used by the service.

pub mod token;

pub use token::TokenManager;

use crate::error::SyncResult;
use async_trait::async_trait;

/// Scopes requested by the `get_google_token` binary
pub const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Supplies bearer tokens to the Google API clients
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Get a currently valid access token
    async fn access_token(&self) -> SyncResult<String>;
}

/// Fixed access token, for tests and short-lived tooling
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> SyncResult<String> {
        Ok(self.0.clone())
    }
}
