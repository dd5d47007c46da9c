//! Column filters, the warranty-id search and the ad-hoc KPI filters.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::followup::FollowUpSummary;
use crate::model::warranty::{Brand, FollowUpStatus, WarrantyRecord};

/// Tri-state filter over a boolean field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagFilter {
    #[default]
    All,
    Yes,
    No,
}

impl FlagFilter {
    pub const ALL: [FlagFilter; 3] = [FlagFilter::All, FlagFilter::Yes, FlagFilter::No];

    pub fn key(&self) -> &'static str {
        match self {
            FlagFilter::All => "All",
            FlagFilter::Yes => "Yes",
            FlagFilter::No => "No",
        }
    }

    pub fn from_key(key: &str) -> FlagFilter {
        match key {
            "Yes" => FlagFilter::Yes,
            "No" => FlagFilter::No,
            _ => FlagFilter::All,
        }
    }

    pub fn matches(&self, value: bool) -> bool {
        match self {
            FlagFilter::All => true,
            FlagFilter::Yes => value,
            FlagFilter::No => !value,
        }
    }
}

/// Filter over the Follow-ups Done column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoneFilter {
    #[default]
    All,
    Count(u8),
    /// Review received; tracking closed.
    Completed,
}

impl DoneFilter {
    pub const ALL: [DoneFilter; 6] = [
        DoneFilter::All,
        DoneFilter::Count(0),
        DoneFilter::Count(1),
        DoneFilter::Count(2),
        DoneFilter::Count(3),
        DoneFilter::Completed,
    ];

    pub fn key(&self) -> String {
        match self {
            DoneFilter::All => "All".to_string(),
            DoneFilter::Count(count) => count.to_string(),
            DoneFilter::Completed => "Completed".to_string(),
        }
    }

    pub fn from_key(key: &str) -> DoneFilter {
        match key {
            "Completed" => DoneFilter::Completed,
            other => other
                .parse::<u8>()
                .ok()
                .filter(|count| *count <= 3)
                .map(DoneFilter::Count)
                .unwrap_or(DoneFilter::All),
        }
    }

    pub fn matches(&self, record: &WarrantyRecord, summary: Option<&FollowUpSummary>) -> bool {
        match self {
            DoneFilter::All => true,
            DoneFilter::Completed => record.feedback_received,
            DoneFilter::Count(count) => {
                !record.feedback_received && record.followups_count(summary) == *count
            }
        }
    }
}

/// Per-column constraints; every field defaults to "All".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFilters {
    pub brand: Option<Brand>,
    pub warranty_card_sent: FlagFilter,
    pub feedback_received: FlagFilter,
    pub extended_warranty_sent: FlagFilter,
    pub follow_up_status: Option<FollowUpStatus>,
    pub followups_done: DoneFilter,
    /// Computed predicate; evaluated after the search step.
    pub due_today: FlagFilter,
}

impl ColumnFilters {
    /// Equality predicates over stored fields.
    pub fn matches(&self, record: &WarrantyRecord, summary: Option<&FollowUpSummary>) -> bool {
        self.brand.is_none_or(|brand| record.brand == Some(brand))
            && self.warranty_card_sent.matches(record.warranty_card_sent)
            && self.feedback_received.matches(record.feedback_received)
            && self.extended_warranty_sent.matches(record.extended_warranty_sent)
            && self
                .follow_up_status
                .is_none_or(|status| record.follow_up_status == status)
            && self.followups_done.matches(record, summary)
    }

    pub fn clear(&mut self) {
        *self = ColumnFilters::default();
    }

    pub fn any_active(&self) -> bool {
        *self != ColumnFilters::default()
    }
}

/// Exact warranty-id match; a blank search matches everything.
pub fn search_matches(record: &WarrantyRecord, search: &str) -> bool {
    let search = search.trim();
    search.is_empty() || record.warranty_id == search
}

/// Filters applied by clicking a KPI card. At most one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdHocFilter {
    RegistrationsToday,
    ReviewPending,
    ReviewsWon,
    DueToday,
}

impl AdHocFilter {
    pub fn label(&self) -> &'static str {
        match self {
            AdHocFilter::RegistrationsToday => "Registered today",
            AdHocFilter::ReviewPending => "Review pending",
            AdHocFilter::ReviewsWon => "Reviews won",
            AdHocFilter::DueToday => "Follow-ups due today",
        }
    }

    pub fn matches(&self, record: &WarrantyRecord, clock: &Clock) -> bool {
        match self {
            AdHocFilter::RegistrationsToday => record
                .timestamp
                .is_some_and(|registered| registered >= clock.start_of_today),
            AdHocFilter::ReviewPending => record.is_review_pending(),
            AdHocFilter::ReviewsWon => record.feedback_received,
            AdHocFilter::DueToday => record.is_due_on(clock.today),
        }
    }
}

/// The viewer's "today", pinned once per pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub today: NaiveDate,
    pub start_of_today: DateTime<Utc>,
}

impl Clock {
    pub fn for_day(today: NaiveDate) -> Self {
        Clock {
            today,
            start_of_today: crate::dates::start_of_day(today),
        }
    }

    pub fn now() -> Self {
        Clock::for_day(chrono::Local::now().date_naive())
    }
}

/// Cached follow-up summaries keyed by warranty id.
pub type Summaries = HashMap<String, FollowUpSummary>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_filter_treats_feedback_as_completed() {
        let mut record = WarrantyRecord {
            followups_done: Some(2),
            ..Default::default()
        };
        assert!(DoneFilter::Count(2).matches(&record, None));
        assert!(!DoneFilter::Completed.matches(&record, None));

        record.feedback_received = true;
        assert!(!DoneFilter::Count(2).matches(&record, None));
        assert!(DoneFilter::Completed.matches(&record, None));
    }

    #[test]
    fn done_filter_falls_back_to_summary_count() {
        let record = WarrantyRecord::default();
        let summary = FollowUpSummary {
            count: 1,
            ..Default::default()
        };
        assert!(DoneFilter::Count(1).matches(&record, Some(&summary)));
        assert!(DoneFilter::Count(0).matches(&record, None));
    }

    #[test]
    fn filter_keys_round_trip_and_unknown_means_all() {
        for filter in DoneFilter::ALL {
            assert_eq!(DoneFilter::from_key(&filter.key()), filter);
        }
        assert_eq!(DoneFilter::from_key("7"), DoneFilter::All);
        assert_eq!(FlagFilter::from_key("maybe"), FlagFilter::All);
    }

    #[test]
    fn clear_resets_every_column() {
        let mut filters = ColumnFilters {
            brand: Some(Brand::Drogo),
            due_today: FlagFilter::Yes,
            ..Default::default()
        };
        assert!(filters.any_active());
        filters.clear();
        assert!(!filters.any_active());
    }

    #[test]
    fn search_is_exact_on_warranty_id() {
        let record = WarrantyRecord {
            warranty_id: "BB-10".to_string(),
            ..Default::default()
        };
        assert!(search_matches(&record, ""));
        assert!(search_matches(&record, " BB-10 "));
        assert!(!search_matches(&record, "BB-1"));
    }
}
