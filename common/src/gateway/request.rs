use std::fmt;

use crate::gateway::Action;
use crate::requests::FormParams;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// Fully resolved request handed to a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<&'static str>,
    pub body: Option<String>,
}

/// One action call before the base URL and token are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub action: Action,
    params: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(action: Action) -> Self {
        ApiRequest {
            action,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn with(mut self, payload: &impl FormParams) -> Self {
        self.params.extend(payload.to_params());
        self
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Token first, then `action`, then the payload, all URL-encoded.
    fn encoded_pairs(&self, token: &str) -> String {
        let token = (!token.is_empty()).then_some(("token", token.to_string()));
        let action = self.action.wire_name().map(|name| ("action", name.to_string()));
        token
            .into_iter()
            .chain(action)
            .chain(self.params.iter().cloned())
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_http(&self, base: &str, token: &str) -> HttpRequest {
        let pairs = self.encoded_pairs(token);
        match self.action.method() {
            Method::Get => {
                let separator = if base.contains('?') { '&' } else { '?' };
                HttpRequest {
                    method: Method::Get,
                    url: format!("{base}{separator}{pairs}"),
                    content_type: None,
                    body: None,
                }
            }
            Method::Post => HttpRequest {
                method: Method::Post,
                url: base.to_string(),
                content_type: Some(FORM_CONTENT_TYPE),
                body: Some(pairs),
            },
        }
    }
}
