//! SMTP relay for the email fallback endpoint.

use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::SmtpSettings;

/// Body of `POST /api/email/send`. Extra fields sent by the dashboard (the
/// customer data used to render the message) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html_body: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MailError {
    /// The request cannot be turned into a message.
    Invalid(String),
    /// The SMTP server refused or could not be reached.
    Relay(String),
}

/// Something that delivers a message and reports its Message-ID.
pub trait Mailer: Send + Sync {
    fn send(&self, request: &SendRequest) -> Result<String, MailError>;
}

/// Optional mailer shared with the handlers; `None` when SMTP is unset.
#[derive(Clone, Default)]
pub struct MailerState {
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl MailerState {
    pub fn new(mailer: Option<Arc<dyn Mailer>>) -> Self {
        MailerState { mailer }
    }
}

fn mailbox(name: Option<&str>, address: &str, field: &str) -> Result<Mailbox, MailError> {
    let address: Address = address
        .trim()
        .parse()
        .map_err(|_| MailError::Invalid(format!("Invalid {} address: {}", field, address)))?;
    let name = name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok(Mailbox::new(name, address))
}

/// Builds the HTML message and the Message-ID it carries.
pub fn build_message(request: &SendRequest) -> Result<(Message, String), MailError> {
    let mut missing = Vec::new();
    for (field, value) in [
        ("to", &request.to),
        ("subject", &request.subject),
        ("htmlBody", &request.html_body),
        ("fromEmail", &request.from_email),
    ] {
        if value.trim().is_empty() {
            missing.push(format!("{} is required", field));
        }
    }
    if !missing.is_empty() {
        return Err(MailError::Invalid(missing.join(", ")));
    }

    let from = mailbox(Some(&request.from_name), &request.from_email, "from")?;
    let to = mailbox(None, &request.to, "recipient")?;
    let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(request.subject.trim())
        .message_id(Some(message_id.clone()))
        .header(ContentType::TEXT_HTML);
    if let Some(reply_to) = request.reply_to.as_deref().filter(|r| !r.trim().is_empty()) {
        builder = builder.reply_to(mailbox(None, reply_to, "reply-to")?);
    }
    let message = builder
        .body(request.html_body.clone())
        .map_err(|e| MailError::Invalid(e.to_string()))?;
    Ok((message, message_id))
}

pub struct SmtpMailer {
    smtp: SmtpTransport,
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS, anything else STARTTLS.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if settings.port == 465 {
            SmtpTransport::relay(&settings.host)
        } else {
            SmtpTransport::starttls_relay(&settings.host)
        }
        .map_err(|e| MailError::Relay(e.to_string()))?
        .port(settings.port);

        let builder = if settings.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
        };
        Ok(SmtpMailer {
            smtp: builder.build(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, request: &SendRequest) -> Result<String, MailError> {
        let (message, message_id) = build_message(request)?;
        self.smtp
            .send(&message)
            .map_err(|e| MailError::Relay(e.to_string()))?;
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SendRequest {
        SendRequest {
            to: "asha@example.com".to_string(),
            subject: "Your Baybee Warranty Card - W-1".to_string(),
            html_body: "<p>Hello</p>".to_string(),
            from_email: "care@baybee.example".to_string(),
            from_name: "Baybee Care".to_string(),
            reply_to: Some("support@baybee.example".to_string()),
        }
    }

    #[test]
    fn builds_html_message_with_message_id() {
        let (message, id) = build_message(&request()).unwrap();
        assert!(id.ends_with("@baybee.example>"));
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("Reply-To: support@baybee.example"));
        assert!(raw.contains("Baybee Care"));
    }

    #[test]
    fn reports_every_missing_field() {
        let err = build_message(&SendRequest {
            to: String::new(),
            subject: " ".to_string(),
            ..request()
        })
        .unwrap_err();
        assert_eq!(
            err,
            MailError::Invalid("to is required, subject is required".to_string())
        );
    }

    #[test]
    fn rejects_malformed_recipient() {
        let err = build_message(&SendRequest {
            to: "not-an-address".to_string(),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, MailError::Invalid(msg) if msg.contains("recipient")));
    }
}
