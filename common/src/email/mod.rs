//! Warranty-card email composer.
//!
//! Validation runs before anything is sent and reports every violation at
//! once. Sending tries the primary path (the backend's `sendWarrantyEmail`
//! action) and falls back to the SMTP relay only when the primary fails.

pub mod templates;

use std::sync::LazyLock;

use futures::future::LocalBoxFuture;
use log::{info, warn};
use regex::Regex;

use crate::error::DashboardError;
use crate::gateway::{SheetsClient, Transport};
use crate::model::email::{
    DeliveryPath, EmailPreview, EmailReceipt, EmailSendResult, EmailTemplateData, OutgoingEmail,
};
use crate::model::warranty::Brand;

pub use templates::{brand_config, escape_html, render_html, subject};

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// One way of delivering an email.
pub trait EmailSender {
    fn send(&self, email: OutgoingEmail)
    -> LocalBoxFuture<'static, Result<EmailSendResult, DashboardError>>;
}

impl<T: Transport + 'static> EmailSender for SheetsClient<T> {
    fn send(
        &self,
        email: OutgoingEmail,
    ) -> LocalBoxFuture<'static, Result<EmailSendResult, DashboardError>> {
        let client = self.clone();
        Box::pin(async move { client.send_warranty_email(&email).await })
    }
}

fn supported_brand(raw: &str) -> Option<Brand> {
    Brand::ALL
        .into_iter()
        .find(|brand| brand.as_str() == raw.trim())
}

/// Every violation in `data`, in field order.
pub fn validation_errors(data: &EmailTemplateData) -> Vec<String> {
    let required = [
        (&data.customer_name, "Customer name is required"),
        (&data.warranty_id, "Warranty ID is required"),
        (&data.product, "Product is required"),
        (&data.brand, "Brand is required"),
        (&data.email, "Email is required"),
        (&data.phone, "Phone is required"),
        (&data.purchase_date, "Purchase date is required"),
    ];
    let mut errors: Vec<String> = required
        .iter()
        .filter(|(value, _)| value.trim().is_empty())
        .map(|(_, message)| message.to_string())
        .collect();

    let email = data.email.trim();
    let email_ok = EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email));
    if !email.is_empty() && !email_ok {
        errors.push("Invalid email format".to_string());
    }

    if !data.brand.trim().is_empty() && supported_brand(&data.brand).is_none() {
        let names: Vec<&str> = Brand::ALL.iter().map(|brand| brand.as_str()).collect();
        errors.push(format!("Invalid brand. Must be one of: {}", names.join(", ")));
    }
    errors
}

/// Validates and returns the brand to render with.
pub fn validate(data: &EmailTemplateData) -> Result<Brand, DashboardError> {
    let errors = validation_errors(data);
    if !errors.is_empty() {
        return Err(DashboardError::Validation(errors));
    }
    supported_brand(&data.brand)
        .ok_or_else(|| DashboardError::Validation(vec!["Brand is required".to_string()]))
}

/// Subject, body and sender for a validated payload.
pub fn preview(data: &EmailTemplateData) -> Result<EmailPreview, DashboardError> {
    let brand = validate(data)?;
    let config = brand_config(brand);
    Ok(EmailPreview {
        subject: subject(brand, data.warranty_id.trim()),
        html_body: render_html(brand, data)?,
        from_email: config.from_email.to_string(),
        from_name: config.from_name.to_string(),
        reply_to: Some(config.reply_to.to_string()),
    })
}

/// Two-path sender assembled by the caller.
pub struct EmailComposer<P, F> {
    primary: P,
    fallback: F,
}

impl<P: EmailSender, F: EmailSender> EmailComposer<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        EmailComposer { primary, fallback }
    }

    /// Validates, then sends through the primary path and, on failure,
    /// through the fallback. Nothing is sent when validation fails.
    pub async fn send(&self, data: &EmailTemplateData) -> Result<EmailReceipt, DashboardError> {
        let preview = preview(data)?;
        let email = OutgoingEmail {
            to: data.email.trim().to_string(),
            subject: preview.subject,
            html_body: preview.html_body,
            from_email: preview.from_email,
            from_name: preview.from_name,
            reply_to: preview.reply_to,
            customer: data.clone(),
        };

        let primary_error = match self.primary.send(email.clone()).await {
            Ok(result) if result.success => {
                info!("Warranty email for {} sent via primary", data.warranty_id);
                return Ok(EmailReceipt {
                    via: DeliveryPath::Primary,
                    message_id: result.message_id,
                });
            }
            Ok(result) => result.error.unwrap_or_else(|| "Unknown error occurred".to_string()),
            Err(err) => err.to_string(),
        };
        warn!("Primary email path failed ({primary_error}), trying fallback");

        match self.fallback.send(email).await {
            Ok(result) if result.success => Ok(EmailReceipt {
                via: DeliveryPath::Fallback,
                message_id: result.message_id,
            }),
            Ok(result) => Err(DashboardError::Application(
                result.error.unwrap_or_else(|| "Unknown error occurred".to_string()),
            )),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Scripted {
        result: Result<EmailSendResult, DashboardError>,
        sent: Rc<RefCell<Vec<OutgoingEmail>>>,
    }

    impl Scripted {
        fn new(result: Result<EmailSendResult, DashboardError>) -> Self {
            Scripted {
                result,
                sent: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl EmailSender for Scripted {
        fn send(
            &self,
            email: OutgoingEmail,
        ) -> LocalBoxFuture<'static, Result<EmailSendResult, DashboardError>> {
            self.sent.borrow_mut().push(email);
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    fn ok(id: &str) -> Result<EmailSendResult, DashboardError> {
        Ok(EmailSendResult {
            success: true,
            message_id: Some(id.to_string()),
            error: None,
        })
    }

    fn data() -> EmailTemplateData {
        EmailTemplateData {
            customer_name: "Asha".to_string(),
            warranty_id: "BB-1".to_string(),
            product: "Stroller".to_string(),
            brand: "Baybee".to_string(),
            email: "asha@example.com".to_string(),
            phone: "98765".to_string(),
            purchase_date: "2024-06-01".to_string(),
            warranty_card_url: None,
        }
    }

    #[test]
    fn missing_email_and_unknown_brand_give_two_errors() {
        let mut data = data();
        data.email.clear();
        data.brand = "Unknown".to_string();
        let errors = validation_errors(&data);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "Email is required");
        assert!(errors[1].starts_with("Invalid brand"));
    }

    #[test]
    fn malformed_email_is_reported() {
        let mut data = data();
        data.email = "asha@example".to_string();
        assert_eq!(validation_errors(&data), vec!["Invalid email format"]);
    }

    #[test]
    fn email_pattern_is_compiled_once_and_reused() {
        assert!(EMAIL_PATTERN.is_some());
        for (address, valid) in [
            ("asha@example.com", true),
            (" asha@example.com ", true),
            ("asha @example.com", false),
            ("asha@example", false),
        ] {
            let mut data = data();
            data.email = address.to_string();
            assert_eq!(validation_errors(&data).is_empty(), valid, "{address}");
        }
    }

    #[test]
    fn invalid_data_sends_nothing() {
        let primary = Scripted::new(ok("p"));
        let fallback = Scripted::new(ok("f"));
        let composer = EmailComposer::new(primary.clone(), fallback.clone());
        let mut data = data();
        data.phone.clear();
        let err = block_on(composer.send(&data)).unwrap_err();
        assert_eq!(
            err,
            DashboardError::Validation(vec!["Phone is required".to_string()])
        );
        assert!(primary.sent.borrow().is_empty());
        assert!(fallback.sent.borrow().is_empty());
    }

    #[test]
    fn fallback_only_after_primary_failure() {
        let primary = Scripted::new(ok("p-1"));
        let fallback = Scripted::new(ok("f-1"));
        let composer = EmailComposer::new(primary.clone(), fallback.clone());
        let receipt = block_on(composer.send(&data())).unwrap();
        assert_eq!(receipt.via, DeliveryPath::Primary);
        assert!(fallback.sent.borrow().is_empty());
        assert_eq!(
            primary.sent.borrow()[0].subject,
            "Your Baybee Warranty Card - BB-1"
        );

        let primary = Scripted::new(Err(DashboardError::Transport("HTTP 500".to_string())));
        let composer = EmailComposer::new(primary, fallback.clone());
        let receipt = block_on(composer.send(&data())).unwrap();
        assert_eq!(receipt.via, DeliveryPath::Fallback);
        assert_eq!(receipt.message_id.as_deref(), Some("f-1"));
        assert_eq!(fallback.sent.borrow().len(), 1);
    }

    #[test]
    fn both_paths_failing_reports_the_fallback_error() {
        let primary = Scripted::new(Ok(EmailSendResult {
            success: false,
            message_id: None,
            error: Some("quota".to_string()),
        }));
        let fallback = Scripted::new(Ok(EmailSendResult {
            success: false,
            message_id: None,
            error: Some("SMTP not configured".to_string()),
        }));
        let composer = EmailComposer::new(primary, fallback);
        let err = block_on(composer.send(&data())).unwrap_err();
        assert_eq!(
            err,
            DashboardError::Application("SMTP not configured".to_string())
        );
    }
}
