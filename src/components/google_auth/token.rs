use super::AccessTokenSource;
use crate::config::Config;
use crate::error::{google_auth_error, SyncResult};
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client as RedisClient};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REDIS_TOKEN_KEY: &str = "intake_sync:google_token";
/// Refresh tokens this close to expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Clone)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    redis_key: String,
    client: Client,
    redis: RedisClient,
}

impl TokenManager {
    pub fn new(config: &Config) -> SyncResult<Self> {
        let redis = RedisClient::open(config.redis_url.as_str())
            .map_err(|e| google_auth_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redis_key: REDIS_TOKEN_KEY.to_string(),
            client: Client::new(),
            redis,
        })
    }

    /// Get OAuth token from Redis, refreshing it when it is about to expire
    pub async fn get_token(&self) -> SyncResult<Value> {
        let mut redis_conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| google_auth_error(&format!("Failed to connect to Redis: {}", e)))?;

        let token_str: Option<String> = redis_conn
            .get(&self.redis_key)
            .await
            .map_err(|e| google_auth_error(&format!("Failed to read token from Redis: {}", e)))?;

        let token_str = token_str.ok_or_else(|| {
            google_auth_error("No token stored. Run get_google_token to authorize.")
        })?;

        let token: Value = serde_json::from_str(&token_str)
            .map_err(|e| google_auth_error(&format!("Failed to parse token JSON: {}", e)))?;

        if needs_refresh(&token, Utc::now().timestamp()) {
            debug!("Stored Google token expired, refreshing");
            return self.refresh_token(&token).await;
        }

        Ok(token)
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &Value) -> SyncResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| google_auth_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| google_auth_error(&format!("Failed to parse token response: {}", e)))?;

        let token_json = merge_refreshed(refresh_token, &new_token, Utc::now().timestamp())?;
        self.set_token(&token_json).await?;
        info!("Refreshed Google access token");

        Ok(token_json)
    }

    /// Store token data in Redis
    pub async fn set_token(&self, token_json: &Value) -> SyncResult<()> {
        let mut redis_conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| google_auth_error(&format!("Failed to connect to Redis: {}", e)))?;

        let _: () = redis_conn
            .set(&self.redis_key, token_json.to_string())
            .await
            .map_err(|e| google_auth_error(&format!("Failed to save token to Redis: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl AccessTokenSource for TokenManager {
    async fn access_token(&self) -> SyncResult<String> {
        let token = self.get_token().await?;
        token
            .get("access_token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| google_auth_error("No access token available"))
    }
}

/// Tokens without an expiry are treated as still valid
fn needs_refresh(token: &Value, now: i64) -> bool {
    match token.get("expires_at").and_then(|v| v.as_i64()) {
        Some(expires_at) => expires_at <= now + EXPIRY_MARGIN_SECS,
        None => false,
    }
}

/// Attach an absolute expiry to a token endpoint response
pub fn with_expiry(mut token: Value, now: i64) -> SyncResult<Value> {
    let expires_in = token
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);

    let obj = token
        .as_object_mut()
        .ok_or_else(|| google_auth_error("Token data is not an object"))?;
    obj.insert("expires_at".to_string(), json!(now + expires_in));

    Ok(token)
}

/// Combine a refreshed access token with the existing refresh token
fn merge_refreshed(refresh_token: &str, new_token: &Value, now: i64) -> SyncResult<Value> {
    let access_token = new_token
        .get("access_token")
        .cloned()
        .ok_or_else(|| google_auth_error("Token response missing 'access_token' field"))?;

    let merged = json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_in": new_token.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600),
    });

    with_expiry(merged, now)
}
