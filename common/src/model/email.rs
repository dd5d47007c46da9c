//! Warranty-card email payloads.

use serde::{Deserialize, Serialize};

/// Customer fields rendered into a warranty-card email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplateData {
    pub customer_name: String,
    pub warranty_id: String,
    pub product: String,
    /// Raw brand text as typed; validated against the supported brands.
    pub brand: String,
    pub email: String,
    pub phone: String,
    pub purchase_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_card_url: Option<String>,
}

/// Rendered email ready for preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPreview {
    pub subject: String,
    pub html_body: String,
    pub from_email: String,
    pub from_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Message handed to either send path. Also the request body of the backend
/// SMTP fallback endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub from_email: String,
    pub from_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub customer: EmailTemplateData,
}

/// Wire result of both send paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSendResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    Primary,
    Fallback,
}

/// Successful delivery through one of the two paths.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailReceipt {
    pub via: DeliveryPath,
    pub message_id: Option<String>,
}
