use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::{
    auth::{PasswordGrant, TokenState},
    config::ClientConfig,
    error::{MealieError, Result},
};

/// One HTTP call against the Mealie API, kept by value so it can be re-sent
/// unchanged after reauthentication.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, pairs: &[(&str, &str)]) -> Self {
        self.query
            .extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and body of a completed exchange with Mealie.
///
/// Every status, including 4xx and 5xx, comes back as a `MealieResponse`;
/// use [`MealieResponse::error_for_status`] to turn failures into errors.
#[derive(Debug, Clone)]
pub struct MealieResponse {
    status: StatusCode,
    text: String,
}

impl MealieResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Decodes the body. An empty body decodes as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.text)?)
    }

    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(MealieError::Upstream {
                status: self.status,
                body: self.text,
            })
        }
    }
}

/// HTTP client for the Mealie API that hides token expiry from its callers.
///
/// A `401 Unauthorized` triggers one password grant followed by one re-send of
/// the same request; whatever comes back the second time is returned. The
/// client is meant to be created once per process and shared behind an
/// [`Arc`](std::sync::Arc); all methods take `&self`.
pub struct MealieClient {
    config: ClientConfig,
    transport: RwLock<Option<Client>>,
    tokens: RwLock<TokenState>,
}

impl MealieClient {
    /// Validates `config`, builds the transport and fetches the first token.
    ///
    /// Fails with [`MealieError::Configuration`] before any network traffic if
    /// the settings are incomplete, and with [`MealieError::Authentication`]
    /// if Mealie does not issue a token.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let transport = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let client = Self {
            config,
            transport: RwLock::new(Some(transport)),
            tokens: RwLock::new(TokenState::default()),
        };

        tracing::info!("Authenticating with Mealie at {}", client.config.base_url);
        client.reauthenticate().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_authenticated()
    }

    pub async fn token_preview(&self) -> Option<String> {
        self.tokens.read().await.preview()
    }

    pub async fn is_closed(&self) -> bool {
        self.transport.read().await.is_none()
    }

    /// Releases the connection pool. Calling it again is a no-op.
    pub async fn close(&self) {
        if self.transport.write().await.take().is_some() {
            tracing::info!("Closed Mealie client for {}", self.config.base_url);
        } else {
            tracing::debug!("Mealie client already closed");
        }
    }

    /// Fetches a new token and swaps it in, returning the new auth headers.
    ///
    /// On failure the previous token state is kept.
    pub async fn reauthenticate(&self) -> Result<HeaderMap> {
        let state = PasswordGrant::new(&self.config).fetch().await?;
        let header = state.auth_header().clone();
        *self.tokens.write().await = state;
        Ok(header)
    }

    pub async fn request(&self, request: OutboundRequest) -> Result<MealieResponse> {
        let header = self.tokens.read().await.auth_header().clone();
        let response = self.send(&request, header).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!(
            method = %request.method,
            path = %request.path,
            "Mealie rejected the token, reauthenticating"
        );
        let refreshed = self.reauthenticate().await?;
        self.send(&request, refreshed).await
    }

    pub async fn get(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<MealieResponse> {
        self.request(build(Method::GET, path, query, body)).await
    }

    pub async fn post(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<MealieResponse> {
        self.request(build(Method::POST, path, query, body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<MealieResponse> {
        self.request(build(Method::PUT, path, query, body)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<MealieResponse> {
        self.request(build(Method::PATCH, path, query, body)).await
    }

    pub async fn delete(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<MealieResponse> {
        self.request(build(Method::DELETE, path, query, body)).await
    }

    async fn send(&self, request: &OutboundRequest, auth_header: HeaderMap) -> Result<MealieResponse> {
        // Cloning a reqwest Client only bumps a refcount.
        let transport = self
            .transport
            .read()
            .await
            .clone()
            .ok_or(MealieError::Closed)?;

        let url = self.config.url(&request.path);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = transport
            .request(request.method.clone(), &url)
            .headers(auth_header);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Network error calling {} {}: {}", request.method, url, e);
            MealieError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("{} {} -> {}", request.method, url, status);

        Ok(MealieResponse { status, text })
    }
}

fn build(method: Method, path: &str, query: Option<&[(&str, &str)]>, body: Option<&Value>) -> OutboundRequest {
    let mut request = OutboundRequest::new(method, path);
    if let Some(pairs) = query {
        request = request.query(pairs);
    }
    if let Some(body) = body {
        request = request.json(body.clone());
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, text: &str) -> MealieResponse {
        MealieResponse {
            status: StatusCode::from_u16(status).unwrap(),
            text: text.to_string(),
        }
    }

    #[test]
    fn build_keeps_query_and_body() {
        let body = json!({"name": "soup"});
        let request = build(Method::POST, "/api/recipes", Some(&[("page", "2")]), Some(&body));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/recipes");
        assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(request.body, Some(body));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let value: Value = response(204, "").json().unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn error_for_status_keeps_upstream_details() {
        match response(404, "not found").error_for_status() {
            Err(MealieError::Upstream { status, body }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "not found");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert!(response(201, "{}").error_for_status().is_ok());
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = response(200, "<html>").json::<Value>().unwrap_err();
        assert!(matches!(err, MealieError::Decode(_)));
    }
}
