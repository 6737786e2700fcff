use crate::components::google_auth::AccessTokenSource;
use crate::error::{identity_error, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Who is acting on the sheet
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn active_user_email(&self) -> SyncResult<String>;
}

/// Always reports the same address
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn active_user_email(&self) -> SyncResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
}

/// Email of the account the OAuth token belongs to
pub struct GoogleIdentity {
    client: Client,
    url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleIdentity {
    pub fn new(tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self::with_url(GOOGLE_USERINFO_URL, tokens)
    }

    pub fn with_url(url: &str, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn active_user_email(&self) -> SyncResult<String> {
        let access_token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(&self.url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| identity_error(&format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(identity_error(&format!(
                "Failed to fetch user info: HTTP {}",
                response.status()
            )));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| identity_error(&format!("Failed to parse user info: {}", e)))?;

        info.email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| identity_error("User info has no email; is the userinfo.email scope granted?"))
    }
}
