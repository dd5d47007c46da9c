//! Canonical warranty registration record.
//!
//! Backend rows arrive in two casing conventions; `normalize::normalize_record`
//! is the only place that turns them into a `WarrantyRecord`. Once built, a
//! record serializes with the canonical camelCase names, so normalizing a
//! serialized record yields the same record again.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::followup::FollowUpSummary;

/// The three brands the dashboard and the email templates support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Brand {
    Baybee,
    Drogo,
    Domestica,
}

impl Brand {
    pub const ALL: [Brand; 3] = [Brand::Baybee, Brand::Drogo, Brand::Domestica];

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Baybee => "Baybee",
            Brand::Drogo => "Drogo",
            Brand::Domestica => "Domestica",
        }
    }

    /// Case-insensitive match on the brand name. Anything else is unsupported.
    pub fn parse(value: &str) -> Option<Brand> {
        let value = value.trim();
        Brand::ALL
            .into_iter()
            .find(|brand| brand.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Follow-up progress label stored on the registration sheet.
///
/// Variant order is stage order, which is also the sort order of the
/// Follow-Up Status column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum FollowUpStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Follow-up 1 Done")]
    FollowUp1Done,
    #[serde(rename = "Follow-up 2 Done")]
    FollowUp2Done,
    #[serde(rename = "Follow-up 3 Done")]
    FollowUp3Done,
    #[serde(rename = "Completed")]
    Completed,
}

impl FollowUpStatus {
    pub const ALL: [FollowUpStatus; 5] = [
        FollowUpStatus::Pending,
        FollowUpStatus::FollowUp1Done,
        FollowUpStatus::FollowUp2Done,
        FollowUpStatus::FollowUp3Done,
        FollowUpStatus::Completed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FollowUpStatus::Pending => "Pending",
            FollowUpStatus::FollowUp1Done => "Follow-up 1 Done",
            FollowUpStatus::FollowUp2Done => "Follow-up 2 Done",
            FollowUpStatus::FollowUp3Done => "Follow-up 3 Done",
            FollowUpStatus::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<FollowUpStatus> {
        let value = value.trim();
        FollowUpStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value))
    }

    /// Status implied by a number of completed stages (clamped to 3).
    pub fn from_count(count: u8) -> FollowUpStatus {
        match count {
            0 => FollowUpStatus::Pending,
            1 => FollowUpStatus::FollowUp1Done,
            2 => FollowUpStatus::FollowUp2Done,
            _ => FollowUpStatus::FollowUp3Done,
        }
    }

    /// Completed stages implied by the label; `None` once tracking is closed.
    pub fn stages_done(&self) -> Option<u8> {
        match self {
            FollowUpStatus::Pending => Some(0),
            FollowUpStatus::FollowUp1Done => Some(1),
            FollowUpStatus::FollowUp2Done => Some(2),
            FollowUpStatus::FollowUp3Done => Some(3),
            FollowUpStatus::Completed => None,
        }
    }
}

impl fmt::Display for FollowUpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One customer's warranty registration and its workflow flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyRecord {
    pub id: String,
    pub warranty_id: String,
    /// Registration time.
    pub timestamp: Option<DateTime<Utc>>,
    /// `None` when the sheet holds a brand outside the supported three.
    pub brand: Option<Brand>,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub order_id: String,
    pub product: String,
    pub purchased_from: String,
    /// Free-form status text kept for display; workflow logic uses the flags.
    pub status: String,
    pub last_remark: String,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub assigned_agent: String,
    pub last_updated_on: Option<DateTime<Utc>>,
    pub warranty_card_url: String,
    pub source_key: String,
    pub sku: String,
    /// "Not reviewed yet" marker evaluated 24h after registration ("YES"/"NO").
    pub nry24: String,
    pub warranty_card_sent: bool,
    pub feedback_received: bool,
    pub extended_warranty_sent: bool,
    pub follow_up_status: FollowUpStatus,
    /// Authoritative completed-stage count (0..=3) when the backend sends it.
    pub followups_done: Option<u8>,
}

impl WarrantyRecord {
    /// Card sent but no review yet.
    pub fn is_review_pending(&self) -> bool {
        self.warranty_card_sent && !self.feedback_received
    }

    /// Open follow-up whose next due date falls on `day` in local time.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        if self.feedback_received {
            return false;
        }
        self.next_follow_up
            .map(|due| due.with_timezone(&Local).date_naive() == day)
            .unwrap_or(false)
    }

    /// Completed stages: the record's own count, then the cached summary,
    /// then zero.
    pub fn followups_count(&self, summary: Option<&FollowUpSummary>) -> u8 {
        self.followups_done
            .or_else(|| summary.map(|s| s.count))
            .unwrap_or(0)
            .min(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn due_today_respects_local_day_and_feedback() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut record = WarrantyRecord {
            next_follow_up: Some(local(2024, 6, 10, 18, 45)),
            ..Default::default()
        };
        assert!(record.is_due_on(today));

        record.next_follow_up = Some(local(2024, 6, 9, 23, 59));
        assert!(!record.is_due_on(today));

        record.next_follow_up = Some(local(2024, 6, 10, 0, 0) + Duration::minutes(1));
        record.feedback_received = true;
        assert!(!record.is_due_on(today));
    }

    #[test]
    fn followups_count_prefers_record_then_summary() {
        let summary = FollowUpSummary {
            count: 2,
            ..Default::default()
        };
        let mut record = WarrantyRecord::default();
        assert_eq!(record.followups_count(None), 0);
        assert_eq!(record.followups_count(Some(&summary)), 2);
        record.followups_done = Some(1);
        assert_eq!(record.followups_count(Some(&summary)), 1);
    }

    #[test]
    fn labels_parse_back() {
        for status in FollowUpStatus::ALL {
            assert_eq!(FollowUpStatus::parse(status.label()), Some(status));
        }
        assert_eq!(Brand::parse(" drogo "), Some(Brand::Drogo));
        assert_eq!(Brand::parse("Unknown"), None);
    }
}
