#![allow(dead_code)]

use std::sync::Once;

use mcp_mealie::{ClientConfig, MealieClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/api/auth/token";
pub const USERNAME: &str = "chef";
pub const PASSWORD: &str = "secret";

/// A mock Mealie server plus the config pointing at it.
pub struct TestEnvironment {
    pub server: MockServer,
    pub config: ClientConfig,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        // Trailing slash on purpose: the client must strip it.
        let config = ClientConfig::new(format!("{}/", server.uri()), USERNAME, PASSWORD);
        Self { server, config }
    }

    /// Answers the next `times` token requests with `token`.
    pub async fn issue_token(&self, token: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "token_type": "bearer"
            })))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Answers every remaining token request with `status`.
    pub async fn reject_token_requests(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&self.server)
            .await;
    }

    pub async fn connect(&self) -> MealieClient {
        MealieClient::connect(self.config.clone())
            .await
            .expect("Failed to connect to mock Mealie")
    }

    pub async fn token_requests(&self) -> usize {
        self.requests_to(TOKEN_PATH).await
    }

    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "mcp_mealie=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
