//! Three-stage follow-up workflow.
//!
//! `WorkflowState` is the per-record state machine. The dashboard uses it to
//! pre-flight a transition before calling the backend; `FollowUpBook` is the
//! authoritative engine (used by the development sandbox) that records stage
//! completions, computes due dates and keeps the append-only history log.
//!
//! ```text
//! Pending -> FollowUp1Done -> FollowUp2Done -> FollowUp3Done -> Completed
//!    \            \                \
//!     +------------+----------------+--> ReviewCompleted   (review done)
//! ```

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::error::WorkflowError;
use crate::model::followup::{
    FollowUpState, FollowUpSummary, HistoryEntry, StageOutcome, StageSnapshot,
};
use crate::model::warranty::{FollowUpStatus, WarrantyRecord};

/// Days between consecutive follow-up stages.
pub const FOLLOW_UP_INTERVAL_DAYS: i64 = 3;

/// History status written for a review completion.
pub const REVIEW_DONE_LABEL: &str = "Review Done";
/// History status for a free-form log entry that changes no state.
pub const NOTE_LABEL: &str = "Follow-up Note";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    One,
    Two,
    Three,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::One, Stage::Two, Stage::Three];

    pub fn number(&self) -> u8 {
        match self {
            Stage::One => 1,
            Stage::Two => 2,
            Stage::Three => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.number() == number)
    }

    fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }

    /// History status label for completing this stage.
    pub fn done_label(&self) -> FollowUpStatus {
        FollowUpStatus::from_count(self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CompleteStage(Stage),
    ReviewDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    Pending,
    FollowUp1Done,
    FollowUp2Done,
    FollowUp3Done,
    /// All three stages done, then the review arrived.
    Completed,
    /// Review arrived before the stages ran out.
    ReviewCompleted,
}

/// Result of a permitted transition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Apply(WorkflowState),
    /// Nothing to do; the transition was already recorded.
    AlreadyDone,
}

impl WorkflowState {
    fn from_count(count: u8) -> Self {
        match count {
            0 => WorkflowState::Pending,
            1 => WorkflowState::FollowUp1Done,
            2 => WorkflowState::FollowUp2Done,
            _ => WorkflowState::FollowUp3Done,
        }
    }

    /// Latest known state of a table row.
    pub fn from_record(record: &WarrantyRecord, summary: Option<&FollowUpSummary>) -> Self {
        let count = match record.follow_up_status.stages_done() {
            Some(from_status) => record
                .followups_done
                .or_else(|| summary.map(|s| s.count))
                .unwrap_or(from_status)
                .max(from_status),
            None => record.followups_count(summary),
        };
        if record.feedback_received || record.follow_up_status == FollowUpStatus::Completed {
            return if count >= 3 {
                WorkflowState::Completed
            } else {
                WorkflowState::ReviewCompleted
            };
        }
        WorkflowState::from_count(count)
    }

    /// State implied by a `getFollowupState` snapshot.
    pub fn from_snapshot(snapshot: &FollowUpState, feedback_received: bool) -> Self {
        let done = [&snapshot.follow_up1, &snapshot.follow_up2, &snapshot.follow_up3]
            .iter()
            .take_while(|stage| stage.done)
            .count() as u8;
        let count = done.max(snapshot.followups_done.min(3));
        match (feedback_received, count) {
            (true, 3) => WorkflowState::Completed,
            (true, _) => WorkflowState::ReviewCompleted,
            (false, count) => WorkflowState::from_count(count),
        }
    }

    pub fn stages_done(&self) -> u8 {
        match self {
            WorkflowState::Pending => 0,
            WorkflowState::FollowUp1Done => 1,
            WorkflowState::FollowUp2Done => 2,
            WorkflowState::FollowUp3Done | WorkflowState::Completed => 3,
            // Stage count is not tracked once the review short-circuits.
            WorkflowState::ReviewCompleted => 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Completed | WorkflowState::ReviewCompleted)
    }

    /// Label stored in the registration sheet.
    pub fn status(&self) -> FollowUpStatus {
        match self {
            WorkflowState::Pending => FollowUpStatus::Pending,
            WorkflowState::FollowUp1Done => FollowUpStatus::FollowUp1Done,
            WorkflowState::FollowUp2Done => FollowUpStatus::FollowUp2Done,
            WorkflowState::FollowUp3Done => FollowUpStatus::FollowUp3Done,
            WorkflowState::Completed | WorkflowState::ReviewCompleted => FollowUpStatus::Completed,
        }
    }

    /// Next stage that may be completed, if any.
    pub fn next_stage(&self) -> Option<Stage> {
        if self.is_terminal() {
            return None;
        }
        Stage::from_number(self.stages_done() + 1)
    }

    pub fn check(&self, transition: Transition) -> Result<Check, WorkflowError> {
        match transition {
            Transition::ReviewDone => Ok(match self {
                _ if self.is_terminal() => Check::AlreadyDone,
                WorkflowState::FollowUp3Done => Check::Apply(WorkflowState::Completed),
                _ => Check::Apply(WorkflowState::ReviewCompleted),
            }),
            Transition::CompleteStage(stage) => {
                if self.is_terminal() {
                    return Err(WorkflowError::Terminal);
                }
                let done = self.stages_done();
                let wanted = stage.number();
                if wanted <= done {
                    Ok(Check::AlreadyDone)
                } else if wanted == done + 1 {
                    Ok(Check::Apply(WorkflowState::from_count(wanted)))
                } else {
                    Err(WorkflowError::OutOfOrder {
                        stage: wanted,
                        requires: wanted - 1,
                    })
                }
            }
        }
    }
}

/// Who performed a transition and what they noted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Actor {
    pub updated_by: String,
    pub assigned_to: String,
}

#[derive(Debug, Clone, PartialEq)]
struct StageMark {
    at: DateTime<Utc>,
    remark: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Track {
    state: WorkflowState,
    marks: [Option<StageMark>; 3],
    /// Due dates of stages 2 and 3 once stage 1 is done.
    due: [Option<DateTime<Utc>>; 3],
}

impl Track {
    fn new(state: WorkflowState) -> Self {
        Track {
            state,
            marks: [None, None, None],
            due: [None, None, None],
        }
    }

    /// Stages marked here plus those implied by a seeded state.
    fn stages(&self) -> BTreeSet<u8> {
        let seeded = self.state.stages_done();
        Stage::ALL
            .into_iter()
            .filter(|stage| self.marks[stage.index()].is_some() || stage.number() <= seeded)
            .map(|stage| stage.number())
            .collect()
    }

    fn next_due(&self) -> Option<DateTime<Utc>> {
        self.state.next_stage().and_then(|stage| self.due[stage.index()])
    }

    fn outcome(&self, already_done: bool) -> StageOutcome {
        let first = self.marks[0].as_ref();
        StageOutcome {
            already_done,
            followups_done: self.stages().len() as u8,
            f1_timestamp: first.map(|mark| mark.at),
            f1_remark: first.map(|mark| mark.remark.clone()),
            follow_up2_date: self.due[1],
            follow_up3_date: self.due[2],
        }
    }
}

/// Authoritative follow-up store: per-warranty stage marks plus the history
/// log. History entries are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct FollowUpBook {
    tracks: HashMap<String, Track>,
    log: Vec<HistoryEntry>,
}

impl FollowUpBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a warranty from its stored state and, when known, the
    /// due date of its next stage. Existing tracks are left untouched.
    pub fn register(
        &mut self,
        warranty_id: &str,
        state: WorkflowState,
        next_due: Option<DateTime<Utc>>,
    ) {
        self.tracks.entry(warranty_id.to_string()).or_insert_with(|| {
            let mut track = Track::new(state);
            if let Some(stage) = state.next_stage() {
                track.due[stage.index()] = next_due;
            }
            track
        });
    }

    pub fn contains(&self, warranty_id: &str) -> bool {
        self.tracks.contains_key(warranty_id)
    }

    pub fn state(&self, warranty_id: &str) -> Option<WorkflowState> {
        self.tracks.get(warranty_id).map(|track| track.state)
    }

    /// Applies a transition at `now`.
    ///
    /// Completing stage 1 fixes the due dates: stage 2 is due
    /// `FOLLOW_UP_INTERVAL_DAYS` after stage 1, stage 3 the same interval
    /// after stage 2's due date. A repeated transition returns
    /// `already_done` and writes no history.
    pub fn apply(
        &mut self,
        warranty_id: &str,
        transition: Transition,
        remark: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<StageOutcome, WorkflowError> {
        let track = self
            .tracks
            .get_mut(warranty_id)
            .ok_or_else(|| WorkflowError::UnknownWarranty(warranty_id.to_string()))?;

        let next = match track.state.check(transition)? {
            Check::AlreadyDone => return Ok(track.outcome(true)),
            Check::Apply(next) => next,
        };

        let (label, follow_up_date) = match transition {
            Transition::CompleteStage(stage) => {
                track.marks[stage.index()] = Some(StageMark {
                    at: now,
                    remark: remark.to_string(),
                });
                if stage == Stage::One {
                    let interval = Duration::days(FOLLOW_UP_INTERVAL_DAYS);
                    let second = now + interval;
                    track.due[1] = Some(second);
                    track.due[2] = Some(second + interval);
                }
                (stage.done_label().label().to_string(), Some(now))
            }
            Transition::ReviewDone => (REVIEW_DONE_LABEL.to_string(), Some(now)),
        };
        track.state = next;
        let outcome = track.outcome(false);

        self.log.push(HistoryEntry {
            warranty_id: warranty_id.to_string(),
            status: label,
            remark: remark.to_string(),
            follow_up_date,
            assigned_to: actor.assigned_to.clone(),
            updated_by: actor.updated_by.clone(),
            timestamp: Some(now),
        });
        Ok(outcome)
    }

    /// Appends a free-form entry without touching any state.
    pub fn append(&mut self, mut entry: HistoryEntry, now: DateTime<Utc>) {
        if entry.status.trim().is_empty() {
            entry.status = NOTE_LABEL.to_string();
        }
        entry.timestamp = Some(now);
        self.log.push(entry);
    }

    /// Every entry for one warranty, oldest first.
    pub fn history(&self, warranty_id: &str) -> Vec<HistoryEntry> {
        self.log
            .iter()
            .filter(|entry| entry.warranty_id == warranty_id)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self, warranty_id: &str) -> Option<FollowUpState> {
        let track = self.tracks.get(warranty_id)?;
        let done = track.stages();
        let stage = |stage: Stage| match &track.marks[stage.index()] {
            Some(mark) => StageSnapshot {
                done: true,
                date: Some(mark.at),
                remark: mark.remark.clone(),
            },
            None => StageSnapshot {
                done: done.contains(&stage.number()),
                date: track.due[stage.index()],
                remark: String::new(),
            },
        };
        Some(FollowUpState {
            warranty_id: warranty_id.to_string(),
            follow_up1: stage(Stage::One),
            follow_up2: stage(Stage::Two),
            follow_up3: stage(Stage::Three),
            followups_done: done.len() as u8,
        })
    }

    pub fn summary(&self, warranty_id: &str) -> Option<FollowUpSummary> {
        let track = self.tracks.get(warranty_id)?;
        let stages = track.stages();
        Some(FollowUpSummary {
            count: stages.len() as u8,
            stages,
            latest: track.marks.iter().flatten().map(|mark| mark.at).max(),
            next_due: track.next_due(),
        })
    }

    /// Open warranties still waiting for their first follow-up.
    pub fn awaiting_first(&self) -> usize {
        self.tracks
            .values()
            .filter(|track| track.state == WorkflowState::Pending)
            .count()
    }

    /// Next due date for a warranty, for mirroring into the registration row.
    pub fn next_due(&self, warranty_id: &str) -> Option<DateTime<Utc>> {
        self.tracks.get(warranty_id).and_then(Track::next_due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap()
    }

    fn book_with(id: &str) -> FollowUpBook {
        let mut book = FollowUpBook::new();
        book.register(id, WorkflowState::Pending, None);
        book
    }

    fn agent() -> Actor {
        Actor {
            updated_by: "Dashboard".to_string(),
            assigned_to: "ravi".to_string(),
        }
    }

    #[test]
    fn stage_two_before_stage_one_is_rejected() {
        let mut book = book_with("W-1");
        let err = book
            .apply("W-1", Transition::CompleteStage(Stage::Two), "", &agent(), at(1))
            .unwrap_err();
        assert_eq!(err, WorkflowError::OutOfOrder { stage: 2, requires: 1 });
        assert!(book.history("W-1").is_empty());
    }

    #[test]
    fn repeating_stage_one_is_already_done_without_new_history() {
        let mut book = book_with("W-1");
        let first = book
            .apply("W-1", Transition::CompleteStage(Stage::One), "called", &agent(), at(1))
            .unwrap();
        assert!(!first.already_done);
        assert_eq!(first.followups_done, 1);
        assert_eq!(first.follow_up2_date, Some(at(4)));
        assert_eq!(first.follow_up3_date, Some(at(7)));

        let again = book
            .apply("W-1", Transition::CompleteStage(Stage::One), "again", &agent(), at(2))
            .unwrap();
        assert!(again.already_done);
        assert_eq!(again.f1_timestamp, Some(at(1)));
        assert_eq!(again.f1_remark.as_deref(), Some("called"));
        assert_eq!(book.history("W-1").len(), 1);
    }

    #[test]
    fn full_cadence_ends_completed() {
        let mut book = book_with("W-1");
        for (stage, day) in [(Stage::One, 1), (Stage::Two, 4), (Stage::Three, 7)] {
            book.apply("W-1", Transition::CompleteStage(stage), "", &agent(), at(day))
                .unwrap();
        }
        assert_eq!(book.state("W-1"), Some(WorkflowState::FollowUp3Done));
        book.apply("W-1", Transition::ReviewDone, "5 stars", &agent(), at(8))
            .unwrap();
        assert_eq!(book.state("W-1"), Some(WorkflowState::Completed));

        let labels: Vec<String> = book.history("W-1").into_iter().map(|e| e.status).collect();
        assert_eq!(
            labels,
            vec!["Follow-up 1 Done", "Follow-up 2 Done", "Follow-up 3 Done", "Review Done"]
        );
        let summary = book.summary("W-1").unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.latest, Some(at(7)));
        assert_eq!(summary.next_due, None);
    }

    #[test]
    fn review_short_circuits_and_is_terminal() {
        let mut book = book_with("W-1");
        book.apply("W-1", Transition::CompleteStage(Stage::One), "", &agent(), at(1))
            .unwrap();
        book.apply("W-1", Transition::ReviewDone, "", &agent(), at(2))
            .unwrap();
        assert_eq!(book.state("W-1"), Some(WorkflowState::ReviewCompleted));

        let err = book
            .apply("W-1", Transition::CompleteStage(Stage::Two), "", &agent(), at(3))
            .unwrap_err();
        assert_eq!(err, WorkflowError::Terminal);
        let again = book
            .apply("W-1", Transition::ReviewDone, "", &agent(), at(3))
            .unwrap();
        assert!(again.already_done);
        assert_eq!(book.history("W-1").len(), 2);
        assert_eq!(book.next_due("W-1"), None);
    }

    #[test]
    fn snapshot_reports_due_dates_for_open_stages() {
        let mut book = book_with("W-1");
        book.apply("W-1", Transition::CompleteStage(Stage::One), "hi", &agent(), at(1))
            .unwrap();
        let snapshot = book.snapshot("W-1").unwrap();
        assert!(snapshot.follow_up1.done);
        assert_eq!(snapshot.follow_up2.date, Some(at(4)));
        assert!(!snapshot.follow_up3.done);
        assert_eq!(
            WorkflowState::from_snapshot(&snapshot, false),
            WorkflowState::FollowUp1Done
        );
        assert_eq!(book.next_due("W-1"), Some(at(4)));
        assert_eq!(book.awaiting_first(), 0);
    }

    #[test]
    fn unknown_warranty_and_notes() {
        let mut book = FollowUpBook::new();
        let err = book
            .apply("nope", Transition::ReviewDone, "", &agent(), at(1))
            .unwrap_err();
        assert_eq!(err, WorkflowError::UnknownWarranty("nope".to_string()));

        book.append(
            HistoryEntry {
                warranty_id: "nope".to_string(),
                remark: "left voicemail".to_string(),
                ..Default::default()
            },
            at(1),
        );
        let history = book.history("nope");
        assert_eq!(history[0].status, NOTE_LABEL);
        assert_eq!(history[0].timestamp, Some(at(1)));
    }

    #[test]
    fn seeded_track_counts_prior_stages() {
        let mut book = FollowUpBook::new();
        book.register("W-9", WorkflowState::FollowUp2Done, Some(at(5)));
        assert_eq!(book.summary("W-9").unwrap().count, 2);
        assert_eq!(book.next_due("W-9"), Some(at(5)));

        let outcome = book
            .apply("W-9", Transition::CompleteStage(Stage::Three), "", &agent(), at(5))
            .unwrap();
        assert_eq!(outcome.followups_done, 3);
        assert_eq!(book.next_due("W-9"), None);
    }

    #[test]
    fn record_state_prefers_authoritative_count() {
        let record = WarrantyRecord {
            followups_done: Some(2),
            follow_up_status: FollowUpStatus::FollowUp2Done,
            ..Default::default()
        };
        let state = WorkflowState::from_record(&record, None);
        assert_eq!(state, WorkflowState::FollowUp2Done);
        assert_eq!(state.next_stage(), Some(Stage::Three));
        assert_eq!(
            state.check(Transition::CompleteStage(Stage::One)),
            Ok(Check::AlreadyDone)
        );

        let reviewed = WarrantyRecord {
            feedback_received: true,
            ..record
        };
        assert!(WorkflowState::from_record(&reviewed, None).is_terminal());
    }
}
