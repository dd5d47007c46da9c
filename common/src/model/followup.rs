//! Follow-up tracking payloads: per-record summaries, per-stage snapshots,
//! workflow history entries and the response to a stage transition.
//!
//! Dates coming from the backend use the same lenient parsing as registration
//! rows (ISO strings, epoch milliseconds or timestamp objects).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::de_timestamp;

/// Lazily fetched per-record digest shown in the Follow-ups Done column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSummary {
    #[serde(default)]
    pub count: u8,
    /// Completed stage numbers, always a subset of {1, 2, 3}.
    #[serde(default)]
    pub stages: BTreeSet<u8>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub latest: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub next_due: Option<DateTime<Utc>>,
}

impl FollowUpSummary {
    /// Drops stage numbers outside 1..=3 and clamps the count.
    pub fn sanitized(mut self) -> Self {
        self.stages.retain(|stage| (1..=3).contains(stage));
        self.count = self.count.min(3);
        self
    }
}

/// State of a single follow-up stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSnapshot {
    #[serde(default)]
    pub done: bool,
    /// Completion date for done stages, due date otherwise. Stage 1 reports
    /// it as `timestamp`.
    #[serde(default, alias = "timestamp", deserialize_with = "de_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub remark: String,
}

/// `getFollowupState` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpState {
    #[serde(default)]
    pub warranty_id: String,
    #[serde(default)]
    pub follow_up1: StageSnapshot,
    #[serde(default)]
    pub follow_up2: StageSnapshot,
    #[serde(default)]
    pub follow_up3: StageSnapshot,
    #[serde(default)]
    pub followups_done: u8,
}

impl FollowUpState {
    pub fn stage(&self, number: u8) -> Option<&StageSnapshot> {
        match number {
            1 => Some(&self.follow_up1),
            2 => Some(&self.follow_up2),
            3 => Some(&self.follow_up3),
            _ => None,
        }
    }
}

/// One immutable row of the workflow log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub warranty_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub follow_up_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response to `updateFollowUpStatus` / `markFollowUp`.
///
/// The due dates for stages 2 and 3 are computed by the server; the dashboard
/// only displays them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    /// The stage was already recorded; nothing was written.
    #[serde(default)]
    pub already_done: bool,
    #[serde(default)]
    pub followups_done: u8,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub f1_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub f1_remark: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub follow_up2_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub follow_up3_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_sanitizes_out_of_range_stages() {
        let summary: FollowUpSummary = serde_json::from_value(json!({
            "count": 7,
            "stages": [3, 1, 9, 0],
            "latest": "2024-06-01T10:00:00Z",
            "nextDue": null
        }))
        .unwrap();
        let summary = summary.sanitized();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.stages.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(summary.latest.is_some());
        assert!(summary.next_due.is_none());
    }

    #[test]
    fn stage_one_timestamp_alias_is_read() {
        let state: FollowUpState = serde_json::from_value(json!({
            "warrantyId": "W-1",
            "followUp1": { "done": true, "timestamp": "2024-06-01T10:00:00Z", "remark": "called" },
            "followUp2": { "done": false, "date": "2024-06-04T10:00:00Z", "remark": "" },
            "followupsDone": 1
        }))
        .unwrap();
        assert!(state.follow_up1.date.is_some());
        assert_eq!(state.stage(2).map(|s| s.done), Some(false));
        assert_eq!(state.stage(4), None);
    }

    #[test]
    fn outcome_reads_already_done_flag() {
        let outcome: StageOutcome = serde_json::from_value(json!({
            "success": true,
            "alreadyDone": true,
            "followupsDone": 1
        }))
        .unwrap();
        assert!(outcome.already_done);
        assert_eq!(outcome.followups_done, 1);
        assert_eq!(outcome.follow_up2_date, None);
    }
}
