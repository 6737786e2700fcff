use intake_sync::components::google_auth::token::with_expiry;
use intake_sync::components::google_auth::{TokenManager, GOOGLE_SCOPES};
use intake_sync::config::Config;
use intake_sync::error::{google_auth_error, other_error};
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const CALLBACK_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Load configuration
    let config = Config::load()?;

    let token_manager = TokenManager::new(&config)?;

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let mut auth_url = Url::parse("https://accounts.google.com/o/oauth2/v2/auth")
        .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &config.google_client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", &GOOGLE_SCOPES.join(" "))
        .append_pair("state", &state);

    // Open browser for authorization
    println!("Opening browser for Google authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser. Visit this URL:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http(CALLBACK_ADDR)
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    // Handle the callback
    let request = server
        .recv()
        .map_err(|e| other_error(&format!("Failed to receive callback: {}", e)))?;
    let callback = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(google_auth_error("State mismatch in authorization callback").into());
    }
    let code = param("code")
        .ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let response = reqwest::Client::new()
        .post("https://oauth2.googleapis.com/token")
        .form(&[
            ("client_id", config.google_client_id.clone()),
            ("client_secret", config.google_client_secret.clone()),
            ("code", code),
            ("redirect_uri", REDIRECT_URI.to_string()),
            ("grant_type", "authorization_code".to_string()),
        ])
        .send()
        .await
        .map_err(intake_sync::error::Error::from)?;

    if !response.status().is_success() {
        let error_text = response.text().await.map_err(intake_sync::error::Error::from)?;
        return Err(google_auth_error(&format!("Failed to get token: {}", error_text)).into());
    }

    let token_data: serde_json::Value =
        response.json().await.map_err(intake_sync::error::Error::from)?;
    let token_data = with_expiry(token_data, chrono::Utc::now().timestamp())?;

    // Save token using TokenManager
    token_manager.set_token(&token_data).await?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    if let Err(e) = request.respond(response) {
        eprintln!("Failed to answer the browser: {}", e);
    }

    println!("Token successfully saved to Redis!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn test_callback_server_is_loopback_only() {
        let addr: SocketAddr = CALLBACK_ADDR.parse().unwrap();
        let redirect = Url::parse(REDIRECT_URI).unwrap();

        assert!(addr.ip().is_loopback());
        assert_eq!(redirect.port(), Some(addr.port()));
    }
}
