//! Connection settings for a Mealie server, read once from the environment.

use std::fmt;
use std::time::Duration;

use crate::client::error::{MealieError, Result};

pub const URL_VAR: &str = "MEALIE_URL";
pub const USERNAME_VAR: &str = "MEALIE_USERNAME";
pub const PASSWORD_VAR: &str = "MEALIE_PASSWORD";
pub const TIMEOUT_VAR: &str = "MEALIE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base URL and password-grant credentials for one Mealie server.
///
/// Values are taken as-is apart from the trailing `/` on the base URL, which
/// is stripped so paths like `/api/recipes` can be appended directly.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Applied to every request, including the token fetch.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `MEALIE_URL`, `MEALIE_USERNAME`, `MEALIE_PASSWORD` and the
    /// optional `MEALIE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a caller-supplied variable source.
    ///
    /// Unset credentials become empty strings here; [`ClientConfig::validate`]
    /// is what rejects them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) if !raw.trim().is_empty() => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    MealieError::Configuration(format!(
                        "{} must be a whole number of seconds, got '{}'",
                        TIMEOUT_VAR, raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self::new(var(URL_VAR), var(USERNAME_VAR), var(PASSWORD_VAR)).with_timeout(timeout))
    }

    /// Rejects configurations that could never authenticate.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            (URL_VAR, &self.base_url),
            (USERNAME_VAR, &self.username),
            (PASSWORD_VAR, &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(MealieError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(MealieError::Configuration(format!(
                "{} must start with http:// or https://, got '{}'",
                URL_VAR, self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(MealieError::Configuration(format!(
                "{} must be greater than zero",
                TIMEOUT_VAR
            )));
        }

        Ok(())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn strips_trailing_slashes_from_base_url() {
        let config = ClientConfig::from_lookup(lookup(&[
            (URL_VAR, "https://mealie.example//"),
            (USERNAME_VAR, "chef"),
            (PASSWORD_VAR, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://mealie.example");
        assert_eq!(config.url("/api/recipes"), "https://mealie.example/api/recipes");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let config = ClientConfig::from_lookup(lookup(&[(URL_VAR, "https://mealie.example")])).unwrap();

        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, MealieError::Configuration(_)));
        assert!(message.contains(USERNAME_VAR));
        assert!(message.contains(PASSWORD_VAR));
        assert!(!message.contains(URL_VAR));
    }

    #[test]
    fn rejects_base_url_without_scheme() {
        let config = ClientConfig::new("mealie.example", "chef", "secret");
        assert!(matches!(config.validate(), Err(MealieError::Configuration(_))));
    }

    #[test]
    fn parses_timeout_override() {
        let config = ClientConfig::from_lookup(lookup(&[
            (URL_VAR, "http://localhost:9000"),
            (USERNAME_VAR, "chef"),
            (PASSWORD_VAR, "secret"),
            (TIMEOUT_VAR, " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));

        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, MealieError::Configuration(_)));

        let zero = ClientConfig::new("http://localhost:9000", "chef", "secret")
            .with_timeout(Duration::ZERO);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let config = ClientConfig::new("http://localhost:9000", "chef", "secret");
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("chef"));
        assert!(!rendered.contains("secret"));
    }
}
