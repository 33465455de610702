//! Authentication handling for the Mealie API.
//!
//! Mealie hands out bearer tokens through an OAuth2-style password grant on
//! `/api/auth/token`. This module owns the grant itself ([`PasswordGrant`])
//! and the token state every outgoing request reads ([`TokenState`]).

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;

use crate::client::config::ClientConfig;
use crate::client::error::{MealieError, Result};
use crate::client::types::{AuthForm, AuthToken};

const TOKEN_PATH: &str = "/api/auth/token";

/// Current bearer token plus the headers derived from it.
///
/// The two fields only change together: a new value is built with
/// [`TokenState::bearer`] and swapped in whole.
#[derive(Clone, Default)]
pub struct TokenState {
    access_token: Option<String>,
    auth_header: HeaderMap,
}

impl TokenState {
    pub fn bearer(access_token: String) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", access_token)).map_err(|_| {
            MealieError::Authentication("token contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);

        let mut auth_header = HeaderMap::new();
        auth_header.insert(AUTHORIZATION, value);

        Ok(Self {
            access_token: Some(access_token),
            auth_header,
        })
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn auth_header(&self) -> &HeaderMap {
        &self.auth_header
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// First ten characters of the token, safe for logs.
    pub fn preview(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .map(|t| format!("{}...", t.chars().take(10).collect::<String>()))
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &self.preview())
            .finish()
    }
}

/// Exchanges username and password for a fresh bearer token.
///
/// Every call builds its own short-lived [`Client`], so a failing grant never
/// touches the connection pool the main client is using.
pub struct PasswordGrant<'a> {
    config: &'a ClientConfig,
}

impl<'a> PasswordGrant<'a> {
    pub fn new(config: &'a ClientConfig) -> Self {
        Self { config }
    }

    pub async fn fetch(&self) -> Result<TokenState> {
        let auth_url = self.config.url(TOKEN_PATH);
        tracing::debug!("Requesting token for user {} from {}", self.config.username, auth_url);

        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| MealieError::Authentication(format!("Failed to build auth client: {}", e)))?;

        let form = AuthForm {
            username: &self.config.username,
            password: &self.config.password,
            remember_me: "true",
        };

        let response = client
            .post(&auth_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error during authentication: {}", e);
                MealieError::Authentication(format!(
                    "Failed to connect to Mealie server at {}: {}",
                    self.config.base_url, e
                ))
            })?;

        let status = response.status();
        tracing::debug!("Authentication response status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("Authentication failed with status {}: {}", status, error_body);

            let message = match status.as_u16() {
                400 | 401 => "Invalid username or password".to_string(),
                403 => "Access denied: user account may be disabled".to_string(),
                404 => format!("Token endpoint not found. Check your base URL: {}", self.config.base_url),
                500..=599 => format!("Mealie server error ({}): {}", status, error_body),
                _ => format!("Unexpected status {}: {}", status, error_body),
            };
            return Err(MealieError::Authentication(message));
        }

        let token: AuthToken = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse authentication response: {}", e);
            MealieError::Authentication(format!("Invalid token response from Mealie: {}", e))
        })?;

        match token.access_token {
            Some(access_token) if !access_token.is_empty() => {
                let state = TokenState::bearer(access_token)?;
                tracing::info!("Authentication successful for user: {}", self.config.username);
                tracing::debug!(
                    token = %state.preview().unwrap_or_default(),
                    token_type = %token.token_type.as_deref().unwrap_or("bearer"),
                    "Received token"
                );
                Ok(state)
            }
            _ => {
                tracing::error!("Token response did not contain an access_token");
                Err(MealieError::Authentication(
                    "Token response did not contain an access_token".to_string(),
                ))
            }
        }
    }
}
