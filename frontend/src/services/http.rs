use common::config::RuntimeConfig;
use common::email::EmailSender;
use common::error::DashboardError;
use common::gateway::{HttpRequest, Method, Transport, TransportResponse};
use common::model::email::{EmailSendResult, OutgoingEmail};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_net::http::{Request, RequestBuilder};

/// Runtime configuration document served next to the bundle.
const CONFIG_PATH: &str = "/config.json";

/// `Transport` over `fetch`. Non-2xx statuses are passed through untouched;
/// `parse_body` decides what they mean.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct GlooTransport;

async fn execute(request: HttpRequest) -> Result<TransportResponse, DashboardError> {
    let builder: RequestBuilder = match request.method {
        Method::Get => Request::get(&request.url),
        Method::Post => Request::post(&request.url),
    };
    let builder = match request.content_type {
        Some(content_type) => builder.header("Content-Type", content_type),
        None => builder,
    };
    let response = match request.body {
        Some(body) => builder
            .body(body)
            .map_err(|e| DashboardError::Transport(e.to_string()))?
            .send()
            .await,
        None => builder.send().await,
    }
    .map_err(|e| DashboardError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DashboardError::Transport(e.to_string()))?;
    Ok(TransportResponse { status, body })
}

impl Transport for GlooTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> LocalBoxFuture<'static, Result<TransportResponse, DashboardError>> {
        execute(request).boxed_local()
    }
}

/// Fetches and validates `/config.json`. Called once, before anything else.
pub async fn load_runtime_config() -> Result<RuntimeConfig, DashboardError> {
    let response = Request::get(CONFIG_PATH)
        .send()
        .await
        .map_err(|e| DashboardError::Config(format!("cannot load {}: {}", CONFIG_PATH, e)))?;
    if !response.ok() {
        return Err(DashboardError::Config(format!(
            "{} answered HTTP {}",
            CONFIG_PATH,
            response.status()
        )));
    }
    let raw = response
        .text()
        .await
        .map_err(|e| DashboardError::Config(e.to_string()))?;
    RuntimeConfig::parse(&raw)
}

/// Second email path: the server's SMTP relay endpoint, which takes the
/// `OutgoingEmail` JSON as is.
#[derive(Clone, PartialEq)]
pub struct SmtpFallback {
    url: String,
}

impl SmtpFallback {
    pub fn new(url: &str) -> Self {
        SmtpFallback {
            url: url.to_string(),
        }
    }
}

async fn relay(url: String, email: OutgoingEmail) -> Result<EmailSendResult, DashboardError> {
    let response = Request::post(&url)
        .json(&email)
        .map_err(|e| DashboardError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| DashboardError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DashboardError::Transport(e.to_string()))?;
    match serde_json::from_str::<EmailSendResult>(&body) {
        Ok(result) => Ok(result),
        Err(_) if !(200..300).contains(&status) => {
            Err(DashboardError::Transport(format!("HTTP {}", status)))
        }
        Err(e) => Err(DashboardError::InvalidJson(e.to_string())),
    }
}

impl EmailSender for SmtpFallback {
    fn send(
        &self,
        email: OutgoingEmail,
    ) -> LocalBoxFuture<'static, Result<EmailSendResult, DashboardError>> {
        relay(self.url.clone(), email).boxed_local()
    }
}
