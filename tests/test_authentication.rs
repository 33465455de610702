mod common;

use common::{TestEnvironment, PASSWORD, TOKEN_PATH, USERNAME};
use mcp_mealie::{ClientConfig, MealieClient, MealieError};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_connect_authenticates_with_password_grant() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(format!("username={}", USERNAME)))
        .and(body_string_contains(format!("password={}", PASSWORD)))
        .and(body_string_contains("remember_me=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc123"})))
        .expect(1)
        .mount(&env.server)
        .await;

    let client = env.connect().await;

    assert!(client.is_authenticated().await, "Client should be authenticated");
    assert_eq!(client.token_preview().await.as_deref(), Some("abc123..."));
    assert_eq!(client.base_url(), env.server.uri());
}

#[tokio::test]
async fn test_connect_fails_on_rejected_credentials() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;
    env.reject_token_requests(401).await;

    let result = MealieClient::connect(env.config.clone()).await;

    assert!(
        matches!(result, Err(MealieError::Authentication(_))),
        "Should fail with invalid credentials"
    );
}

#[tokio::test]
async fn test_connect_fails_when_token_is_missing() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&env.server)
        .await;

    let result = MealieClient::connect(env.config.clone()).await;

    match result {
        Err(MealieError::Authentication(message)) => assert!(message.contains("access_token")),
        Err(other) => panic!("expected authentication error, got {}", other),
        Ok(_) => panic!("connect should fail without an access_token"),
    }
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;
    env.issue_token("never-used", 1).await;

    let config = ClientConfig::new(env.server.uri(), USERNAME, "");
    let result = MealieClient::connect(config).await;

    assert!(matches!(result, Err(MealieError::Configuration(_))));
    assert_eq!(env.token_requests().await, 0);
}

#[tokio::test]
async fn test_unreachable_server_is_an_authentication_error() {
    common::init_test_logging();
    // Grab a free port and release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ClientConfig::new(format!("http://127.0.0.1:{}", port), USERNAME, PASSWORD);

    let result = MealieClient::connect(config).await;

    assert!(matches!(result, Err(MealieError::Authentication(_))));
}

#[tokio::test]
#[serial]
async fn test_config_from_env() {
    common::init_test_logging();

    std::env::set_var("MEALIE_URL", "https://mealie.example/");
    std::env::set_var("MEALIE_USERNAME", USERNAME);
    std::env::set_var("MEALIE_PASSWORD", PASSWORD);
    std::env::remove_var("MEALIE_TIMEOUT_SECS");

    let config = ClientConfig::from_env().expect("config should load");

    std::env::remove_var("MEALIE_URL");
    std::env::remove_var("MEALIE_USERNAME");
    std::env::remove_var("MEALIE_PASSWORD");

    assert_eq!(config.base_url, "https://mealie.example");
    assert_eq!(config.username, USERNAME);
    assert_eq!(config.password, PASSWORD);
    assert!(config.validate().is_ok());
}

#[tokio::test]
#[serial]
async fn test_config_from_empty_env_fails_validation() {
    common::init_test_logging();

    std::env::remove_var("MEALIE_URL");
    std::env::remove_var("MEALIE_USERNAME");
    std::env::remove_var("MEALIE_PASSWORD");

    let config = ClientConfig::from_env().expect("unset variables are not a parse error");
    assert!(matches!(config.validate(), Err(MealieError::Configuration(_))));
}
