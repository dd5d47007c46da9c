//! Sign-in gate for the dashboard.
//!
//! The identity provider hands the page a JWT credential. Only its payload is
//! read here (the email claim); signature verification belongs to the
//! provider and the backend. Access is limited to one email domain.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;
use crate::storage::{KeyValueStore, load_json, save_json};

pub const AUTH_STORAGE_KEY: &str = "wm.auth.v1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub authenticated: bool,
    pub email: Option<String>,
    pub token: Option<String>,
}

/// Lower-cased `email` claim of a JWT, if it can be read.
pub fn email_from_jwt(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = BASE64_URL.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims
        .get("email")
        .and_then(Value::as_str)
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
}

pub struct AuthGate<S> {
    store: S,
    allowed_domain: String,
}

impl<S: KeyValueStore> AuthGate<S> {
    pub fn new(store: S, allowed_domain: &str) -> Self {
        AuthGate {
            store,
            allowed_domain: allowed_domain.trim().trim_start_matches('@').to_lowercase(),
        }
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        email
            .to_lowercase()
            .ends_with(&format!("@{}", self.allowed_domain))
    }

    /// Saved session, if it is still acceptable. Anything else is wiped.
    pub fn restore(&self) -> Option<AuthState> {
        let state: Option<AuthState> = load_json(&self.store, AUTH_STORAGE_KEY);
        match state {
            Some(state)
                if state.authenticated
                    && state.token.as_deref().is_some_and(|t| !t.is_empty())
                    && state.email.as_deref().is_some_and(|e| self.is_allowed(e)) =>
            {
                Some(state)
            }
            Some(_) => {
                warn!("Discarding saved session outside @{}", self.allowed_domain);
                self.clear();
                None
            }
            None => None,
        }
    }

    /// Accepts a fresh credential and persists the session.
    pub fn authenticate(&self, credential: &str) -> Result<AuthState, DashboardError> {
        let email = email_from_jwt(credential)
            .ok_or_else(|| DashboardError::Auth("Invalid token".to_string()))?;
        if !self.is_allowed(&email) {
            return Err(DashboardError::Auth(format!(
                "Access denied. Use your @{} account",
                self.allowed_domain
            )));
        }
        let state = AuthState {
            authenticated: true,
            email: Some(email),
            token: Some(credential.to_string()),
        };
        save_json(&self.store, AUTH_STORAGE_KEY, &state);
        info!("Signed in as {}", state.email.as_deref().unwrap_or_default());
        Ok(state)
    }

    pub fn logout(&self) {
        self.clear();
    }

    fn clear(&self) {
        if let Err(err) = self.store.remove(AUTH_STORAGE_KEY) {
            warn!("Could not clear session: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    fn jwt(claims: &str) -> String {
        format!(
            "{}.{}.sig",
            BASE64_URL.encode(r#"{"alg":"RS256"}"#),
            BASE64_URL.encode(claims)
        )
    }

    fn gate() -> (Rc<MemoryStore>, AuthGate<Rc<MemoryStore>>) {
        let store = Rc::new(MemoryStore::new());
        (Rc::clone(&store), AuthGate::new(Rc::clone(&store), "galaxyinc.in"))
    }

    #[test]
    fn accepted_credential_is_persisted_and_restored() {
        let (_store, gate) = gate();
        let state = gate
            .authenticate(&jwt(r#"{"email":"Ravi@GalaxyInc.in"}"#))
            .unwrap();
        assert_eq!(state.email.as_deref(), Some("ravi@galaxyinc.in"));
        assert_eq!(gate.restore(), Some(state));
        gate.logout();
        assert_eq!(gate.restore(), None);
    }

    #[test]
    fn wrong_domain_and_missing_email_are_rejected() {
        let (_store, gate) = gate();
        assert_eq!(
            gate.authenticate(&jwt(r#"{"email":"x@gmail.com"}"#)),
            Err(DashboardError::Auth(
                "Access denied. Use your @galaxyinc.in account".to_string()
            ))
        );
        assert_eq!(
            gate.authenticate(&jwt(r#"{"sub":"1"}"#)),
            Err(DashboardError::Auth("Invalid token".to_string()))
        );
        assert_eq!(
            gate.authenticate("garbage"),
            Err(DashboardError::Auth("Invalid token".to_string()))
        );
    }

    #[test]
    fn foreign_saved_session_is_cleared() {
        let (store, gate) = gate();
        let stale = AuthState {
            authenticated: true,
            email: Some("x@other.com".to_string()),
            token: Some("t".to_string()),
        };
        save_json(&*store, AUTH_STORAGE_KEY, &stale);
        assert_eq!(gate.restore(), None);
        assert_eq!(store.get(AUTH_STORAGE_KEY).unwrap(), None);
    }
}
