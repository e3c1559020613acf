//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `MARKETPLACE_API_URL` - Base URL of the REST API (default `http://localhost:3000/api`)
//! - `MARKETPLACE_SESSION_FILE` - Where the credential is persisted
//!   (default `$HOME/.marketplace/session.json`)
//! - `SENTRY_DSN` - Optional Sentry DSN for error tracking

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

const API_URL_VAR: &str = "MARKETPLACE_API_URL";
const SESSION_FILE_VAR: &str = "MARKETPLACE_SESSION_FILE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// API base URL without a trailing slash, e.g. `http://localhost:3000/api`
    pub api_url: String,
    /// Path of the JSON file holding the session credential
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking (optional)
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if no
    /// default session location can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(get_optional_env)
    }

    /// Build a configuration for an explicit API URL and session file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an HTTP(S) URL.
    pub fn new(api_url: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            session_file: session_file.into(),
            sentry_dsn: None,
        })
    }

    fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;

        let session_file = match get(SESSION_FILE_VAR).filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_session_file(get("HOME").or_else(|| get("USERPROFILE")))?,
        };

        let sentry_dsn = get("SENTRY_DSN").filter(|v| !v.is_empty());

        Ok(Self {
            api_url,
            session_file,
            sentry_dsn,
        })
    }
}

/// Validate an API base URL and strip the trailing slash.
fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar(API_URL_VAR.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            API_URL_VAR.to_string(),
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// `<home>/.marketplace/session.json`.
fn default_session_file(home: Option<String>) -> Result<PathBuf, ConfigError> {
    let home = home
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(SESSION_FILE_VAR.to_string()))?;
    Ok(Path::new(&home).join(".marketplace").join("session.json"))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("HOME", "/home/john")]).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(
            config.session_file,
            PathBuf::from("/home/john/.marketplace/session.json")
        );
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let config = load(&[
            ("MARKETPLACE_API_URL", "https://shop.example.com/api/"),
            ("MARKETPLACE_SESSION_FILE", "/tmp/mp.json"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://shop.example.com/api");
        assert_eq!(config.session_file, PathBuf::from("/tmp/mp.json"));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_userprofile_fallback() {
        let config = load(&[("USERPROFILE", "/users/jane")]).unwrap();
        assert!(config.session_file.starts_with("/users/jane"));
    }

    #[test]
    fn test_missing_home_without_session_file() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "MARKETPLACE_SESSION_FILE"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = load(&[("HOME", "/h"), ("MARKETPLACE_API_URL", "ftp://example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("HOME", "/h"), ("MARKETPLACE_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = StorefrontConfig::new("http://127.0.0.1:8080/api/", "/tmp/s.json").unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8080/api");
    }
}
