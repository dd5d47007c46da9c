//! Form payloads of the write actions.
//!
//! The spreadsheet backend receives every write as
//! `application/x-www-form-urlencoded`, so each payload maps to and from a
//! flat list of string pairs. The dashboard encodes with `to_params`; the
//! sandbox decodes with `from_params`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::DashboardError;
use crate::model::warranty::Brand;
use crate::normalize::parse_timestamp;

pub type Params = HashMap<String, String>;

pub trait FormParams: Sized {
    fn to_params(&self) -> Vec<(&'static str, String)>;
    fn from_params(params: &Params) -> Result<Self, DashboardError>;
}

fn required(params: &Params, key: &str) -> Result<String, DashboardError> {
    params
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DashboardError::Validation(vec![format!("{key} is required")]))
}

fn optional(params: &Params, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn optional_time(params: &Params, key: &str) -> Option<DateTime<Utc>> {
    optional(params, key).and_then(|raw| parse_timestamp(&Value::String(raw)))
}

/// `"true"`/`"false"`; anything else counts as absent.
fn optional_flag(params: &Params, key: &str) -> Option<bool> {
    match optional(params, key)?.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn push_opt(out: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        out.push((key, value));
    }
}

/// `listWarranties` query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub brand: Option<Brand>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl FormParams for ListFilter {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        push_opt(&mut out, "brand", self.brand.map(|b| b.to_string()));
        push_opt(&mut out, "start", self.start.map(|t| t.to_rfc3339()));
        push_opt(&mut out, "end", self.end.map(|t| t.to_rfc3339()));
        out
    }

    fn from_params(params: &Params) -> Result<Self, DashboardError> {
        Ok(ListFilter {
            brand: optional(params, "brand").and_then(|raw| Brand::parse(&raw)),
            start: optional_time(params, "start"),
            end: optional_time(params, "end"),
        })
    }
}

/// Implicit update action: patch of the mutable registration fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarrantyPatch {
    pub warranty_id: String,
    pub status: Option<String>,
    pub remark: Option<String>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub updated_by: String,
}

impl FormParams for WarrantyPatch {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![("warrantyId", self.warranty_id.clone())];
        push_opt(&mut out, "status", self.status.clone());
        push_opt(&mut out, "remark", self.remark.clone());
        push_opt(&mut out, "nextFollowUp", self.next_follow_up.map(|t| t.to_rfc3339()));
        push_opt(&mut out, "assignedTo", self.assigned_to.clone());
        out.push(("updatedBy", self.updated_by.clone()));
        out
    }

    fn from_params(params: &Params) -> Result<Self, DashboardError> {
        Ok(WarrantyPatch {
            warranty_id: required(params, "warrantyId")?,
            status: optional(params, "status"),
            remark: optional(params, "remark"),
            next_follow_up: optional_time(params, "nextFollowUp"),
            assigned_to: optional(params, "assignedTo"),
            updated_by: optional(params, "updatedBy").unwrap_or_default(),
        })
    }
}

/// Direct patch of the three workflow flags; `None` leaves a flag as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanFlags {
    pub warranty_id: String,
    pub warranty_card_sent: Option<bool>,
    pub feedback_received: Option<bool>,
    pub extended_warranty_sent: Option<bool>,
    pub updated_by: String,
}

impl BooleanFlags {
    pub fn is_empty(&self) -> bool {
        self.warranty_card_sent.is_none()
            && self.feedback_received.is_none()
            && self.extended_warranty_sent.is_none()
    }
}

impl FormParams for BooleanFlags {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![("warrantyId", self.warranty_id.clone())];
        push_opt(&mut out, "WarrantyCardSent", self.warranty_card_sent.map(|f| f.to_string()));
        push_opt(&mut out, "FeedbackReceived", self.feedback_received.map(|f| f.to_string()));
        push_opt(
            &mut out,
            "ExtendedWarrantySent",
            self.extended_warranty_sent.map(|f| f.to_string()),
        );
        out.push(("updatedBy", self.updated_by.clone()));
        out
    }

    fn from_params(params: &Params) -> Result<Self, DashboardError> {
        Ok(BooleanFlags {
            warranty_id: required(params, "warrantyId")?,
            warranty_card_sent: optional_flag(params, "WarrantyCardSent"),
            feedback_received: optional_flag(params, "FeedbackReceived"),
            extended_warranty_sent: optional_flag(params, "ExtendedWarrantySent"),
            updated_by: optional(params, "updatedBy").unwrap_or_default(),
        })
    }
}

/// `logFollowUpAction` row appended to the workflow log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowUpLogEntry {
    pub warranty_id: String,
    pub customer_name: String,
    pub brand: String,
    pub follow_up_no: u8,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub status: String,
    pub remark: String,
    pub assigned_to: String,
    pub updated_by: String,
}

impl FormParams for FollowUpLogEntry {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("warrantyId", self.warranty_id.clone()),
            ("customerName", self.customer_name.clone()),
            ("brand", self.brand.clone()),
            ("followUpNo", self.follow_up_no.to_string()),
        ];
        push_opt(&mut out, "followUpDate", self.follow_up_date.map(|t| t.to_rfc3339()));
        push_opt(&mut out, "nextDueDate", self.next_due_date.map(|t| t.to_rfc3339()));
        out.extend([
            ("status", self.status.clone()),
            ("remark", self.remark.clone()),
            ("assignedTo", self.assigned_to.clone()),
            ("updatedBy", self.updated_by.clone()),
        ]);
        out
    }

    fn from_params(params: &Params) -> Result<Self, DashboardError> {
        Ok(FollowUpLogEntry {
            warranty_id: required(params, "warrantyId")?,
            customer_name: optional(params, "customerName").unwrap_or_default(),
            brand: optional(params, "brand").unwrap_or_default(),
            follow_up_no: optional(params, "followUpNo")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0),
            follow_up_date: optional_time(params, "followUpDate"),
            next_due_date: optional_time(params, "nextDueDate"),
            status: optional(params, "status").unwrap_or_default(),
            remark: optional(params, "remark").unwrap_or_default(),
            assigned_to: optional(params, "assignedTo").unwrap_or_default(),
            updated_by: optional(params, "updatedBy").unwrap_or_default(),
        })
    }
}

/// `updateSku` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkuUpdate {
    pub warranty_id: String,
    pub sku: String,
    pub updated_by: String,
}

impl FormParams for SkuUpdate {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("warrantyId", self.warranty_id.clone()),
            ("sku", self.sku.clone()),
            ("updatedBy", self.updated_by.clone()),
        ]
    }

    fn from_params(params: &Params) -> Result<Self, DashboardError> {
        Ok(SkuUpdate {
            warranty_id: required(params, "warrantyId")?,
            sku: required(params, "sku")?,
            updated_by: optional(params, "updatedBy").unwrap_or_default(),
        })
    }
}

/// Turns encoded pairs back into a lookup map.
pub fn params_of(pairs: &[(&'static str, String)]) -> Params {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_only_send_what_changed() {
        let flags = BooleanFlags {
            warranty_id: "W-1".to_string(),
            feedback_received: Some(true),
            updated_by: "Dashboard".to_string(),
            ..Default::default()
        };
        let pairs = flags.to_params();
        assert!(pairs.iter().all(|(key, _)| *key != "WarrantyCardSent"));
        let decoded = BooleanFlags::from_params(&params_of(&pairs)).unwrap();
        assert_eq!(decoded, flags);
        assert!(!decoded.is_empty());
    }

    #[test]
    fn missing_id_is_a_validation_error() {
        let err = SkuUpdate::from_params(&Params::new()).unwrap_err();
        assert_eq!(
            err,
            DashboardError::Validation(vec!["warrantyId is required".to_string()])
        );
    }

    #[test]
    fn list_filter_ignores_unknown_brand() {
        let mut params = Params::new();
        params.insert("brand".to_string(), "All".to_string());
        params.insert("start".to_string(), "2024-06-01T00:00:00Z".to_string());
        let filter = ListFilter::from_params(&params).unwrap();
        assert_eq!(filter.brand, None);
        assert!(filter.start.is_some());
    }
}
