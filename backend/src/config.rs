//! Server settings read from the environment.
//!
//! Only the frontend-facing subset is published (as `/config.json`); SMTP
//! credentials and the seed path stay on the server.

use std::env;
use std::path::PathBuf;

use common::config::{
    RuntimeConfig, DEFAULT_ALLOWED_EMAIL_DOMAIN, DEFAULT_EMAIL_FALLBACK_URL,
    DEFAULT_GOOGLE_CLIENT_ID,
};

/// Mount point of the development sandbox.
pub const SANDBOX_PATH: &str = "/api/sandbox";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub sheets_api_base: String,
    pub sheets_api_token: String,
    pub allowed_email_domain: String,
    pub email_fallback_url: String,
    pub google_client_id: String,
    pub sandbox: bool,
    pub sandbox_seed: Option<PathBuf>,
    /// `None` disables the email fallback endpoint.
    pub smtp: Option<SmtpSettings>,
    pub open_browser: bool,
}

fn flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

impl Settings {
    pub fn from_env() -> Self {
        Settings::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let smtp = get("SMTP_HOST").map(|host| SmtpSettings {
            host,
            port: get("SMTP_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: get("SMTP_USERNAME").unwrap_or_default(),
            password: get("SMTP_PASSWORD").unwrap_or_default(),
        });

        Settings {
            host: get("WM_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: get("WM_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            sheets_api_base: get("SHEETS_API_BASE").unwrap_or_default(),
            sheets_api_token: get("SHEETS_API_TOKEN").unwrap_or_default(),
            allowed_email_domain: get("ALLOWED_EMAIL_DOMAIN")
                .unwrap_or_else(|| DEFAULT_ALLOWED_EMAIL_DOMAIN.to_string()),
            email_fallback_url: get("EMAIL_FALLBACK_URL")
                .unwrap_or_else(|| DEFAULT_EMAIL_FALLBACK_URL.to_string()),
            google_client_id: get("GOOGLE_CLIENT_ID")
                .unwrap_or_else(|| DEFAULT_GOOGLE_CLIENT_ID.to_string()),
            sandbox: flag(get("WM_SANDBOX")),
            sandbox_seed: get("WM_SANDBOX_SEED").map(PathBuf::from),
            smtp,
            open_browser: get("WM_OPEN_BROWSER").map_or(true, |value| flag(Some(value))),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Document served as `/config.json`. With the sandbox enabled the
    /// dashboard is pointed at it instead of the spreadsheet backend.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            sheets_api_base: if self.sandbox {
                SANDBOX_PATH.to_string()
            } else {
                self.sheets_api_base.clone()
            },
            sheets_api_token: self.sheets_api_token.clone(),
            email_fallback_url: self.email_fallback_url.clone(),
            allowed_email_domain: self.allowed_email_domain.clone(),
            sandbox: self.sandbox,
            google_client_id: self.google_client_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.url(), "http://127.0.0.1:8080");
        assert!(!s.sandbox);
        assert!(s.smtp.is_none());
        assert!(s.open_browser);
        assert_eq!(s.runtime_config().email_fallback_url, "/api/email/send");
    }

    #[test]
    fn sandbox_overrides_published_base() {
        let s = settings(&[
            ("WM_SANDBOX", "1"),
            ("SHEETS_API_BASE", "https://script.google.com/macros/s/x/exec"),
            ("SHEETS_API_TOKEN", "secret"),
        ]);
        let published = s.runtime_config();
        assert_eq!(published.sheets_api_base, SANDBOX_PATH);
        assert_eq!(published.sheets_api_token, "secret");
        assert!(published.validate().is_ok());
    }

    #[test]
    fn smtp_requires_host_and_parses_port() {
        let s = settings(&[("SMTP_PORT", "2525")]);
        assert!(s.smtp.is_none());

        let s = settings(&[("SMTP_HOST", "smtp.example.com"), ("SMTP_PORT", "2525")]);
        let smtp = s.smtp.unwrap();
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.username, "");

        let s = settings(&[("WM_PORT", "not-a-port"), ("WM_OPEN_BROWSER", "0")]);
        assert_eq!(s.port, 8080);
        assert!(!s.open_browser);
    }
}
