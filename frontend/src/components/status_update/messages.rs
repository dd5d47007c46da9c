use common::error::DashboardError;
use common::model::followup::{FollowUpState, HistoryEntry, StageOutcome};
use common::workflow::Stage;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagField {
    WarrantyCardSent,
    FeedbackReceived,
    ExtendedWarrantySent,
}

pub enum Msg {
    Load,
    Loaded {
        ticket: u64,
        state: Result<FollowUpState, DashboardError>,
        history: Result<Vec<HistoryEntry>, DashboardError>,
    },

    SetStageRemark(Stage, String),
    SetReviewRemark(String),
    SetNote(String),
    SetFlag(FlagField, bool),
    SetSku(String),

    CompleteStage(Stage),
    StageSaved(Stage, Result<StageOutcome, DashboardError>),
    MarkReviewDone,
    ReviewSaved(Result<(), DashboardError>),
    SaveNote,
    NoteSaved(Result<(), DashboardError>),
    SaveFlags,
    FlagsSaved(Result<Value, DashboardError>),
    SaveSku,
    SkuSaved(Result<(), DashboardError>),

    SendEmail,
    Close,
}
