//! Error taxonomy shared by every layer of the dashboard.
//!
//! `DashboardError` is `Clone` because a single in-flight batch request may be
//! awaited by several table rows at once and each of them receives the same
//! failure.

use thiserror::Error;

/// Failures surfaced to the user or to the caller of a service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// Missing or invalid runtime configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or non-2xx HTTP status.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with an HTML document where JSON was expected,
    /// usually an auth redirect or a misconfigured deployment.
    #[error("Non-JSON response (HTML): {0}")]
    HtmlResponse(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// `success:false` envelope; the message is shown verbatim.
    #[error("{0}")]
    Application(String),

    /// Pre-flight field checks. Always carries the complete list.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("{0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Follow-up transitions rejected because of ordering rules.
///
/// Repeating a completed stage is not an error; see
/// `workflow::Check::AlreadyDone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Follow-up {stage} requires follow-up {requires} to be completed first")]
    OutOfOrder { stage: u8, requires: u8 },

    #[error("Review already completed; no further follow-ups apply")]
    Terminal,

    #[error("Unknown warranty: {0}")]
    UnknownWarranty(String),
}

impl DashboardError {
    /// True for `success:false` envelopes and workflow rejections, which are
    /// shown verbatim instead of as a generic failure.
    pub fn is_application(&self) -> bool {
        matches!(
            self,
            DashboardError::Application(_) | DashboardError::Workflow(_)
        )
    }
}
