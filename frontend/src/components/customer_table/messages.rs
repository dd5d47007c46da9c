/// Column whose filter select changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Brand,
    WarrantyCardSent,
    FeedbackReceived,
    ExtendedWarrantySent,
    FollowUpStatus,
    FollowUpsDone,
    DueToday,
}

pub enum Msg {
    SetFilter(FilterKey, String),
    ClearFilters,
    ToggleFilterRow,
    OpenChooser,
    CloseChooser,
    ToggleColumn(&'static str, bool),
    /// Moves a visible column by `offset` positions.
    MoveColumn(&'static str, isize),
    ResetColumns,
}
