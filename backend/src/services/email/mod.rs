//! # Email Fallback Service
//!
//! Secondary delivery path for warranty-card emails. The dashboard first asks
//! the spreadsheet backend to send the message; when that fails it posts the
//! same rendered message here and the server relays it over SMTP.
//!
//! ## Sub-modules:
//! - `mailer`: message construction and the SMTP transport.
//! - `send`: the HTTP handler.

pub mod mailer;
mod send;

use actix_web::web::{post, scope};
use actix_web::Scope;

pub use mailer::{Mailer, MailerState, SmtpMailer};

const API_PATH: &str = "/api/email";

/// Registers the email routes under `/api/email`.
///
/// *   **`POST /send`**:
///     - **Handler**: `send::process`
///     - **Description**: Accepts `{to, subject, htmlBody, fromEmail, fromName, replyTo?}`
///       and relays it through the configured SMTP server. Answers
///       `{success, messageId?, error?}`; `503` when SMTP is not configured,
///       `400` for a malformed message, `502` when the relay refuses it.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/send", post().to(send::process))
}
