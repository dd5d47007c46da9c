use serde_json::Value;

use crate::error::DashboardError;

/// Raw HTTP result as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        TransportResponse {
            status: 200,
            body: body.into(),
        }
    }
}

const SNIPPET_CHARS: usize = 200;

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Status check, HTML detection and JSON parsing of a response body.
pub fn parse_body(response: &TransportResponse) -> Result<Value, DashboardError> {
    if !(200..300).contains(&response.status) {
        return Err(DashboardError::Transport(format!(
            "HTTP {}",
            response.status
        )));
    }
    let text = response.body.trim();
    if looks_like_html(text) {
        return Err(DashboardError::HtmlResponse(snippet(text)));
    }
    serde_json::from_str(text).map_err(|_| DashboardError::InvalidJson(snippet(text)))
}

/// Unwraps `{success, data?, error?}`.
///
/// `success:false` becomes an `Application` error carrying `error`. An
/// envelope with `data` yields the data; anything else (flat KPI objects,
/// bare arrays) is returned as is.
pub fn unwrap_envelope(value: Value) -> Result<Value, DashboardError> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = map
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or("Unknown API error");
        return Err(DashboardError::Application(message.to_string()));
    }
    match map.remove("data") {
        Some(data) => Ok(data),
        None => Ok(Value::Object(map)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn html_bodies_are_reported_with_a_snippet() {
        let page = format!("  <!DOCTYPE html><html>{}</html>", "x".repeat(500));
        let err = parse_body(&TransportResponse::ok(page)).unwrap_err();
        match err {
            DashboardError::HtmlResponse(text) => {
                assert_eq!(text.chars().count(), 200);
                assert!(text.starts_with("<!DOCTYPE"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse_body(&TransportResponse::ok("<HTML><body>login</body></HTML>")),
            Err(DashboardError::HtmlResponse(_))
        ));
    }

    #[test]
    fn non_2xx_and_bad_json() {
        let err = parse_body(&TransportResponse {
            status: 502,
            body: "{}".to_string(),
        })
        .unwrap_err();
        assert_eq!(err, DashboardError::Transport("HTTP 502".to_string()));
        assert!(matches!(
            parse_body(&TransportResponse::ok("{oops")),
            Err(DashboardError::InvalidJson(_))
        ));
    }

    #[test]
    fn envelope_shapes() {
        assert_eq!(
            unwrap_envelope(json!({ "success": true, "data": [1, 2] })),
            Ok(json!([1, 2]))
        );
        assert_eq!(
            unwrap_envelope(json!({ "count": 4, "asOf": "2024-06-10T08:00:00Z" })),
            Ok(json!({ "count": 4, "asOf": "2024-06-10T08:00:00Z" }))
        );
        assert_eq!(
            unwrap_envelope(json!({ "success": false, "error": "Unauthorized" })),
            Err(DashboardError::Application("Unauthorized".to_string()))
        );
        assert_eq!(
            unwrap_envelope(json!({ "success": false })),
            Err(DashboardError::Application("Unknown API error".to_string()))
        );
    }
}
