use common::guard::Generation;
use common::model::followup::{FollowUpState, HistoryEntry};
use common::model::warranty::WarrantyRecord;
use common::requests::BooleanFlags;
use common::workflow::{Stage, WorkflowState};
use yew::NodeRef;

use super::messages::FlagField;

pub struct StatusUpdateModal {
    pub sheet_ref: NodeRef,
    pub load_generation: Generation,
    pub loading: bool,
    pub load_error: Option<String>,
    pub snapshot: Option<FollowUpState>,
    pub history: Vec<HistoryEntry>,

    /// Typed remarks per stage; survive failed saves.
    pub stage_remarks: [String; 3],
    pub review_remark: String,
    pub note: String,
    pub warranty_card_sent: bool,
    pub feedback_received: bool,
    pub extended_warranty_sent: bool,
    pub sku: String,

    /// A write is in flight; buttons are disabled.
    pub saving: bool,
}

impl StatusUpdateModal {
    pub fn new(record: &WarrantyRecord) -> Self {
        Self {
            sheet_ref: NodeRef::default(),
            load_generation: Generation::new(),
            loading: true,
            load_error: None,
            snapshot: None,
            history: Vec::new(),
            stage_remarks: Default::default(),
            review_remark: String::new(),
            note: String::new(),
            warranty_card_sent: record.warranty_card_sent,
            feedback_received: record.feedback_received,
            extended_warranty_sent: record.extended_warranty_sent,
            sku: record.sku.clone(),
            saving: false,
        }
    }

    /// Best current knowledge of the workflow: the loaded snapshot when
    /// available, otherwise the table row.
    pub fn known_state(&self, record: &WarrantyRecord) -> WorkflowState {
        match &self.snapshot {
            Some(snapshot) => WorkflowState::from_snapshot(snapshot, record.feedback_received),
            None => WorkflowState::from_record(record, None),
        }
    }

    pub fn stage_remark(&self, stage: Stage) -> &str {
        &self.stage_remarks[usize::from(stage.number() - 1)]
    }

    pub fn stage_remark_mut(&mut self, stage: Stage) -> &mut String {
        &mut self.stage_remarks[usize::from(stage.number() - 1)]
    }

    pub fn flag(&self, field: FlagField) -> bool {
        match field {
            FlagField::WarrantyCardSent => self.warranty_card_sent,
            FlagField::FeedbackReceived => self.feedback_received,
            FlagField::ExtendedWarrantySent => self.extended_warranty_sent,
        }
    }

    pub fn set_flag(&mut self, field: FlagField, value: bool) {
        match field {
            FlagField::WarrantyCardSent => self.warranty_card_sent = value,
            FlagField::FeedbackReceived => self.feedback_received = value,
            FlagField::ExtendedWarrantySent => self.extended_warranty_sent = value,
        }
    }

    /// Only the flags that differ from the row are sent.
    pub fn changed_flags(&self, record: &WarrantyRecord, updated_by: &str) -> BooleanFlags {
        let changed = |now: bool, before: bool| (now != before).then_some(now);
        BooleanFlags {
            warranty_id: record.warranty_id.clone(),
            warranty_card_sent: changed(self.warranty_card_sent, record.warranty_card_sent),
            feedback_received: changed(self.feedback_received, record.feedback_received),
            extended_warranty_sent: changed(
                self.extended_warranty_sent,
                record.extended_warranty_sent,
            ),
            updated_by: updated_by.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::followup::StageSnapshot;
    use common::model::warranty::FollowUpStatus;

    fn record() -> WarrantyRecord {
        WarrantyRecord {
            warranty_id: "W-7".to_string(),
            follow_up_status: FollowUpStatus::FollowUp1Done,
            warranty_card_sent: true,
            ..Default::default()
        }
    }

    #[test]
    fn snapshot_wins_over_table_row() {
        let record = record();
        let mut modal = StatusUpdateModal::new(&record);
        assert_eq!(modal.known_state(&record), WorkflowState::FollowUp1Done);

        let done = StageSnapshot {
            done: true,
            ..Default::default()
        };
        modal.snapshot = Some(FollowUpState {
            warranty_id: "W-7".to_string(),
            follow_up1: done.clone(),
            follow_up2: done,
            followups_done: 2,
            ..Default::default()
        });
        assert_eq!(modal.known_state(&record), WorkflowState::FollowUp2Done);
    }

    #[test]
    fn only_changed_flags_are_sent() {
        let record = record();
        let mut modal = StatusUpdateModal::new(&record);
        assert!(modal.changed_flags(&record, "a@galaxyinc.in").is_empty());

        modal.set_flag(FlagField::FeedbackReceived, true);
        let flags = modal.changed_flags(&record, "a@galaxyinc.in");
        assert_eq!(flags.feedback_received, Some(true));
        assert_eq!(flags.warranty_card_sent, None);
        assert_eq!(flags.updated_by, "a@galaxyinc.in");
    }

    #[test]
    fn remarks_are_kept_per_stage() {
        let mut modal = StatusUpdateModal::new(&record());
        modal.stage_remark_mut(Stage::Two).push_str("called twice");
        assert_eq!(modal.stage_remark(Stage::Two), "called twice");
        assert_eq!(modal.stage_remark(Stage::One), "");
    }
}
