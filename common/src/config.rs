//! Runtime configuration published by the server as `/config.json`.
//!
//! The document is fetched once before the dashboard renders. Nothing can talk
//! to the spreadsheet backend until `RuntimeConfig::parse` has accepted it.

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Every production deployment of the backend is an Apps Script web app.
pub const MACRO_BASE_PREFIX: &str = "https://script.google.com/macros/";

pub const DEFAULT_EMAIL_FALLBACK_URL: &str = "/api/email/send";

pub const DEFAULT_ALLOWED_EMAIL_DOMAIN: &str = "galaxyinc.in";

pub const DEFAULT_GOOGLE_CLIENT_ID: &str =
    "902896635203-c905kjbs3dnk6fu5flktclq6d7kdgk09.apps.googleusercontent.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(rename = "SHEETS_API_BASE", default)]
    pub sheets_api_base: String,

    #[serde(rename = "SHEETS_API_TOKEN", default)]
    pub sheets_api_token: String,

    #[serde(rename = "EMAIL_FALLBACK_URL", default = "default_fallback_url")]
    pub email_fallback_url: String,

    #[serde(rename = "ALLOWED_EMAIL_DOMAIN", default = "default_domain")]
    pub allowed_email_domain: String,

    /// Points the dashboard at the local sandbox, which is served from a
    /// relative path instead of an Apps Script URL.
    #[serde(rename = "SANDBOX", default)]
    pub sandbox: bool,

    /// OAuth client used by the Google Identity Services sign-in button.
    #[serde(rename = "GOOGLE_CLIENT_ID", default = "default_client_id")]
    pub google_client_id: String,
}

fn default_fallback_url() -> String {
    DEFAULT_EMAIL_FALLBACK_URL.to_string()
}

fn default_domain() -> String {
    DEFAULT_ALLOWED_EMAIL_DOMAIN.to_string()
}

fn default_client_id() -> String {
    DEFAULT_GOOGLE_CLIENT_ID.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            sheets_api_base: String::new(),
            sheets_api_token: String::new(),
            email_fallback_url: default_fallback_url(),
            allowed_email_domain: default_domain(),
            sandbox: false,
            google_client_id: default_client_id(),
        }
    }
}

impl RuntimeConfig {
    /// Parses and validates the raw `/config.json` body.
    pub fn parse(raw: &str) -> Result<Self, DashboardError> {
        let config: RuntimeConfig = serde_json::from_str(raw)
            .map_err(|e| DashboardError::Config(format!("config.json is not valid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        let base = self.sheets_api_base.trim();
        if base.is_empty() {
            return Err(DashboardError::Config(
                "SHEETS_API_BASE missing. Check runtime configuration.".to_string(),
            ));
        }
        if !self.sandbox && !base.starts_with(MACRO_BASE_PREFIX) {
            return Err(DashboardError::Config(format!(
                "SHEETS_API_BASE invalid: expected a URL starting with {}",
                MACRO_BASE_PREFIX
            )));
        }
        if self.allowed_email_domain.trim().is_empty() {
            return Err(DashboardError::Config(
                "ALLOWED_EMAIL_DOMAIN must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_apps_script_base_and_fills_defaults() {
        let config = RuntimeConfig::parse(
            r#"{"SHEETS_API_BASE":"https://script.google.com/macros/s/abc/exec","SHEETS_API_TOKEN":"t"}"#,
        )
        .unwrap();
        assert_eq!(config.email_fallback_url, DEFAULT_EMAIL_FALLBACK_URL);
        assert_eq!(config.allowed_email_domain, "galaxyinc.in");
        assert!(!config.sandbox);
        assert_eq!(config.google_client_id, DEFAULT_GOOGLE_CLIENT_ID);
    }

    #[test]
    fn rejects_missing_or_foreign_base() {
        let missing = RuntimeConfig::parse(r#"{"SHEETS_API_TOKEN":"t"}"#).unwrap_err();
        assert!(matches!(missing, DashboardError::Config(_)));

        let foreign = RuntimeConfig::parse(r#"{"SHEETS_API_BASE":"https://example.com/api"}"#)
            .unwrap_err();
        assert!(foreign.to_string().contains(MACRO_BASE_PREFIX));
    }

    #[test]
    fn sandbox_allows_relative_base() {
        let config =
            RuntimeConfig::parse(r#"{"SHEETS_API_BASE":"/api/sandbox","SANDBOX":true}"#).unwrap();
        assert!(config.sandbox);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        assert!(matches!(
            RuntimeConfig::parse("<html>"),
            Err(DashboardError::Config(_))
        ));
    }
}
