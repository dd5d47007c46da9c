//! Action dispatch for the sandbox.
//!
//! Every action answers with the `{success, data?, error?}` envelope. Stage
//! transitions and the two KPI actions answer flat (their fields next to
//! `success`), matching what the dashboard expects from the spreadsheet.

use chrono::{DateTime, Duration, Utc};
use common::error::DashboardError;
use common::gateway::Action;
use common::model::followup::{HistoryEntry, StageOutcome};
use common::model::warranty::WarrantyRecord;
use common::requests::{
    BooleanFlags, FollowUpLogEntry, FormParams, ListFilter, Params, SkuUpdate, WarrantyPatch,
};
use common::workflow::{Actor, Stage, Transition, WorkflowState};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::state::Sandbox;

const DEFAULT_UPDATED_BY: &str = "Dashboard";

/// Successful payload of one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Wrapped as `{success:true, data}`.
    Data(Value),
    /// Object whose fields are merged next to `success:true`.
    Flat(Map<String, Value>),
}

/// Wire form of an action result.
pub fn envelope(result: Result<Reply, DashboardError>) -> Value {
    match result {
        Ok(Reply::Data(data)) => json!({ "success": true, "data": data }),
        Ok(Reply::Flat(mut fields)) => {
            fields.insert("success".to_string(), Value::Bool(true));
            Value::Object(fields)
        }
        Err(err) => json!({ "success": false, "error": err.to_string() }),
    }
}

fn to_value(value: &impl Serialize) -> Result<Value, DashboardError> {
    serde_json::to_value(value).map_err(|e| DashboardError::InvalidJson(e.to_string()))
}

fn flat(value: &impl Serialize) -> Result<Reply, DashboardError> {
    match to_value(value)? {
        Value::Object(fields) => Ok(Reply::Flat(fields)),
        other => Ok(Reply::Data(other)),
    }
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn require<'a>(params: &'a Params, key: &str) -> Result<&'a str, DashboardError> {
    param(params, key).ok_or_else(|| DashboardError::Validation(vec![format!("{key} is required")]))
}

fn is_true(params: &Params, key: &str) -> bool {
    param(params, key).is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Kpi {
    count: usize,
    as_of: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageReply {
    #[serde(flatten)]
    outcome: StageOutcome,
    follow_up_status: String,
}

impl Sandbox {
    /// Runs one action against the in-memory sheet at `now`.
    pub fn handle(
        &mut self,
        action: Action,
        params: &Params,
        now: DateTime<Utc>,
    ) -> Result<Reply, DashboardError> {
        if !self.token.is_empty() && param(params, "token") != Some(self.token.as_str()) {
            return Err(DashboardError::Application("Unauthorized".to_string()));
        }

        match action {
            Action::ListWarranties => {
                let filter = ListFilter::from_params(params)?;
                let mut rows: Vec<&WarrantyRecord> = self
                    .records
                    .iter()
                    .filter(|record| filter.brand.is_none() || record.brand == filter.brand)
                    .filter(|record| match record.timestamp {
                        Some(at) => {
                            filter.start.is_none_or(|start| at >= start)
                                && filter.end.is_none_or(|end| at <= end)
                        }
                        None => true,
                    })
                    .collect();
                rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                Ok(Reply::Data(to_value(&rows)?))
            }
            Action::UpdateWarranty => {
                let patch = WarrantyPatch::from_params(params)?;
                let record = self.record_mut(&patch.warranty_id)?;
                if let Some(status) = patch.status {
                    record.status = status;
                }
                if let Some(remark) = patch.remark {
                    record.last_remark = remark;
                }
                if patch.next_follow_up.is_some() {
                    record.next_follow_up = patch.next_follow_up;
                }
                if let Some(agent) = patch.assigned_to {
                    record.assigned_agent = agent;
                }
                record.last_updated_on = Some(now);
                Ok(Reply::Data(to_value(record)?))
            }
            Action::LogFollowUpAction => {
                let entry = FollowUpLogEntry::from_params(params)?;
                self.book.append(
                    HistoryEntry {
                        warranty_id: entry.warranty_id,
                        status: entry.status,
                        remark: entry.remark,
                        follow_up_date: entry.follow_up_date,
                        assigned_to: entry.assigned_to,
                        updated_by: entry.updated_by,
                        timestamp: None,
                    },
                    now,
                );
                Ok(Reply::Data(Value::Null))
            }
            Action::UpdateReviewAndTriggerCard => {
                let warranty_id = require(params, "warrantyId")?.to_string();
                let mut already_done = true;
                if is_true(params, "reviewDone") {
                    let remark = param(params, "remarks").unwrap_or_default();
                    let outcome =
                        self.transition(&warranty_id, Transition::ReviewDone, remark, params, now)?;
                    already_done = outcome.already_done;
                }
                if is_true(params, "extendedWarrantySent") {
                    let record = self.record_mut(&warranty_id)?;
                    record.extended_warranty_sent = true;
                    record.last_updated_on = Some(now);
                }
                let status = self.record_mut(&warranty_id)?.follow_up_status;
                Ok(Reply::Flat(Map::from_iter([
                    ("alreadyDone".to_string(), Value::Bool(already_done)),
                    ("followUpStatus".to_string(), Value::String(status.label().to_string())),
                ])))
            }
            Action::UpdateBooleanFlags => {
                let flags = BooleanFlags::from_params(params)?;
                if flags.is_empty() {
                    return Err(DashboardError::Validation(vec![
                        "No flags to update".to_string(),
                    ]));
                }
                if flags.feedback_received == Some(true) {
                    self.transition(&flags.warranty_id, Transition::ReviewDone, "", params, now)?;
                }
                let record = self.record_mut(&flags.warranty_id)?;
                if let Some(sent) = flags.warranty_card_sent {
                    record.warranty_card_sent = sent;
                }
                if let Some(received) = flags.feedback_received {
                    record.feedback_received = received;
                }
                if let Some(sent) = flags.extended_warranty_sent {
                    record.extended_warranty_sent = sent;
                }
                record.last_updated_on = Some(now);
                Ok(Reply::Data(to_value(record)?))
            }
            Action::GetHistory => {
                let warranty_id = require(params, "warrantyId")?;
                Ok(Reply::Data(to_value(&self.book.history(warranty_id))?))
            }
            Action::GetFollowupState => {
                let warranty_id = require(params, "warrantyId")?;
                let snapshot = self.book.snapshot(warranty_id).ok_or_else(|| {
                    DashboardError::Application(format!("Warranty not found: {}", warranty_id))
                })?;
                Ok(Reply::Data(to_value(&snapshot)?))
            }
            Action::GetCustomerDetails => {
                let warranty_id = require(params, "warrantyId")?;
                let record = self.record(warranty_id);
                Ok(Reply::Data(match record {
                    Some(record) => to_value(record)?,
                    None => Value::Null,
                }))
            }
            Action::SummaryBatch => {
                let ids = param(params, "ids").unwrap_or_default();
                let mut summaries = Map::new();
                for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
                    let summary = self.book.summary(id).unwrap_or_default();
                    summaries.insert(id.to_string(), to_value(&summary)?);
                }
                Ok(Reply::Data(Value::Object(summaries)))
            }
            Action::FirstFollowupKpi => flat(&Kpi {
                count: self.book.awaiting_first(),
                as_of: now,
            }),
            Action::TodaysFollowupsKpi => flat(&Kpi {
                count: self.due_today(now).count(),
                as_of: now,
            }),
            Action::ListFirstFollowups => {
                let rows: Vec<&WarrantyRecord> = self
                    .records
                    .iter()
                    .filter(|r| self.book.state(&r.warranty_id) == Some(WorkflowState::Pending))
                    .collect();
                Ok(Reply::Data(to_value(&rows)?))
            }
            Action::ListTodaysFollowups => {
                let rows: Vec<&WarrantyRecord> = self.due_today(now).collect();
                Ok(Reply::Data(to_value(&rows)?))
            }
            Action::Evaluate24Nry => {
                let cutoff = now - Duration::hours(24);
                let mut updated = 0;
                for record in self.records.iter_mut() {
                    let old_enough = record.timestamp.is_some_and(|at| at <= cutoff);
                    if old_enough && record.nry24.is_empty() {
                        record.nry24 = if record.feedback_received { "NO" } else { "YES" }.to_string();
                        updated += 1;
                    }
                }
                Ok(Reply::Data(json!({ "updated": updated })))
            }
            Action::UpdateFollowUpStatus => {
                let warranty_id = require(params, "warrantyId")?.to_string();
                let remark = param(params, "followUp1Remark").unwrap_or_default();
                self.stage_reply(&warranty_id, Stage::One, remark, params, now)
            }
            Action::MarkFollowUp => {
                let warranty_id = require(params, "warrantyId")?.to_string();
                let stage = param(params, "followUpNo")
                    .and_then(|raw| raw.parse().ok())
                    .and_then(Stage::from_number)
                    .ok_or_else(|| {
                        DashboardError::Validation(vec!["followUpNo must be 1, 2 or 3".to_string()])
                    })?;
                let remark = param(params, "remark").unwrap_or_default();
                self.stage_reply(&warranty_id, stage, remark, params, now)
            }
            Action::UpdateSku => {
                let update = SkuUpdate::from_params(params)?;
                let record = self.record_mut(&update.warranty_id)?;
                record.sku = update.sku;
                record.last_updated_on = Some(now);
                Ok(Reply::Data(to_value(record)?))
            }
            Action::SendWarrantyEmail => Err(DashboardError::Application(
                "sendWarrantyEmail is not available in the sandbox".to_string(),
            )),
        }
    }

    fn stage_reply(
        &mut self,
        warranty_id: &str,
        stage: Stage,
        remark: &str,
        params: &Params,
        now: DateTime<Utc>,
    ) -> Result<Reply, DashboardError> {
        let outcome =
            self.transition(warranty_id, Transition::CompleteStage(stage), remark, params, now)?;
        let status = self.record_mut(warranty_id)?.follow_up_status;
        flat(&StageReply {
            outcome,
            follow_up_status: status.label().to_string(),
        })
    }

    /// Applies a workflow transition and mirrors it into the row. A repeated
    /// transition changes nothing.
    fn transition(
        &mut self,
        warranty_id: &str,
        transition: Transition,
        remark: &str,
        params: &Params,
        now: DateTime<Utc>,
    ) -> Result<StageOutcome, DashboardError> {
        let record = self.record_mut(warranty_id)?;
        let actor = Actor {
            updated_by: param(params, "updatedBy")
                .unwrap_or(DEFAULT_UPDATED_BY)
                .to_string(),
            assigned_to: record.assigned_agent.clone(),
        };
        let outcome = self.book.apply(warranty_id, transition, remark, &actor, now)?;
        if !outcome.already_done {
            if !remark.is_empty() {
                self.record_mut(warranty_id)?.last_remark = remark.to_string();
            }
            self.sync_record(warranty_id, now);
        }
        Ok(outcome)
    }
}
