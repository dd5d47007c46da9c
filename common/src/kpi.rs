//! Dashboard metrics.
//!
//! Two sources are composed here: counts derived from the scoped and searched
//! record list, and aggregates computed by the backend (`todaysFollowupsKpi`,
//! `firstFollowupKpi`). The backend values are never recomputed locally.

use chrono::Local;

use crate::model::kpi::BackendKpi;
use crate::model::warranty::WarrantyRecord;
use crate::table::{AdHocFilter, Clock, TableQuery, search_matches};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiKind {
    Total,
    RegistrationsToday,
    CardsSent,
    ReviewPending,
    ReviewsWon,
    TodaysDue,
    FirstFollowups,
}

impl KpiKind {
    pub const ALL: [KpiKind; 7] = [
        KpiKind::Total,
        KpiKind::RegistrationsToday,
        KpiKind::CardsSent,
        KpiKind::ReviewPending,
        KpiKind::ReviewsWon,
        KpiKind::TodaysDue,
        KpiKind::FirstFollowups,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            KpiKind::Total => "Total Registrations",
            KpiKind::RegistrationsToday => "Registrations Today",
            KpiKind::CardsSent => "Warranty Cards Sent",
            KpiKind::ReviewPending => "Still Review Pending",
            KpiKind::ReviewsWon => "Reviews Won",
            KpiKind::TodaysDue => "Today's Follow-ups Due",
            KpiKind::FirstFollowups => "1st Follow-ups",
        }
    }

    /// Filter selected by clicking the card, if it narrows the table.
    pub fn ad_hoc(&self) -> Option<AdHocFilter> {
        match self {
            KpiKind::RegistrationsToday => Some(AdHocFilter::RegistrationsToday),
            KpiKind::ReviewPending => Some(AdHocFilter::ReviewPending),
            KpiKind::ReviewsWon => Some(AdHocFilter::ReviewsWon),
            KpiKind::TodaysDue => Some(AdHocFilter::DueToday),
            KpiKind::Total | KpiKind::CardsSent | KpiKind::FirstFollowups => None,
        }
    }

    pub fn clickable(&self) -> bool {
        *self == KpiKind::Total || self.ad_hoc().is_some()
    }
}

/// Backend aggregates; `None` until the request completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendKpis {
    pub todays_due: Option<BackendKpi>,
    pub first_followups: Option<BackendKpi>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSnapshot {
    pub total: usize,
    pub registrations_today: usize,
    pub cards_sent: usize,
    pub review_pending: usize,
    pub reviews_won: usize,
    pub todays_due: Option<BackendKpi>,
    pub first_followups: Option<BackendKpi>,
}

impl KpiSnapshot {
    /// `base` is the scoped list after the search, before column and KPI
    /// filters.
    pub fn compute(base: &[&WarrantyRecord], backend: &BackendKpis, clock: &Clock) -> Self {
        let count = |filter: AdHocFilter| {
            base.iter()
                .filter(|record| filter.matches(record, clock))
                .count()
        };
        KpiSnapshot {
            total: base.len(),
            registrations_today: count(AdHocFilter::RegistrationsToday),
            cards_sent: base.iter().filter(|r| r.warranty_card_sent).count(),
            review_pending: count(AdHocFilter::ReviewPending),
            reviews_won: count(AdHocFilter::ReviewsWon),
            todays_due: backend.todays_due.clone(),
            first_followups: backend.first_followups.clone(),
        }
    }

    pub fn value(&self, kind: KpiKind) -> u64 {
        match kind {
            KpiKind::Total => self.total as u64,
            KpiKind::RegistrationsToday => self.registrations_today as u64,
            KpiKind::CardsSent => self.cards_sent as u64,
            KpiKind::ReviewPending => self.review_pending as u64,
            KpiKind::ReviewsWon => self.reviews_won as u64,
            KpiKind::TodaysDue => self.todays_due.as_ref().map_or(0, |kpi| kpi.count),
            KpiKind::FirstFollowups => self.first_followups.as_ref().map_or(0, |kpi| kpi.count),
        }
    }

    /// Caption under the value. Backend cards show when they were computed.
    pub fn description(&self, kind: KpiKind) -> String {
        let as_of = |kpi: &Option<BackendKpi>, fallback: &str| {
            kpi.as_ref()
                .and_then(|kpi| kpi.as_of)
                .map(|at| format!("as of {}", at.with_timezone(&Local).format("%d/%m/%Y %H:%M")))
                .unwrap_or_else(|| fallback.to_string())
        };
        match kind {
            KpiKind::Total => "in selected range".to_string(),
            KpiKind::RegistrationsToday => "new today".to_string(),
            KpiKind::CardsSent => "cards processed".to_string(),
            KpiKind::ReviewPending => "awaiting review".to_string(),
            KpiKind::ReviewsWon => "feedback received".to_string(),
            KpiKind::TodaysDue => as_of(&self.todays_due, "due today"),
            KpiKind::FirstFollowups => as_of(&self.first_followups, "loading..."),
        }
    }
}

/// Scoped records narrowed by the search; the KPI input.
pub fn kpi_base<'a>(scoped: &[&'a WarrantyRecord], search: &str) -> Vec<&'a WarrantyRecord> {
    scoped
        .iter()
        .copied()
        .filter(|record| search_matches(record, search))
        .collect()
}

/// Applies a card click to the table query. Returns false for cards that
/// are not clickable.
///
/// Total clears the KPI filter and the search; any other clickable card
/// replaces the KPI filter and clears the search.
pub fn select_kpi(query: &mut TableQuery, kind: KpiKind) -> bool {
    if !kind.clickable() {
        return false;
    }
    query.ad_hoc = kind.ad_hoc();
    query.search.clear();
    true
}

/// Card currently highlighted for a query.
pub fn active_kpi(query: &TableQuery) -> Option<KpiKind> {
    query
        .ad_hoc
        .and_then(|filter| KpiKind::ALL.into_iter().find(|kind| kind.ad_hoc() == Some(filter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn clock() -> Clock {
        Clock::for_day(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
    }

    #[test]
    fn counts_come_from_the_base_list_and_backend() {
        let today = Local
            .with_ymd_and_hms(2024, 6, 10, 9, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let records = vec![
            WarrantyRecord {
                timestamp: Some(today),
                warranty_card_sent: true,
                ..Default::default()
            },
            WarrantyRecord {
                warranty_card_sent: true,
                feedback_received: true,
                ..Default::default()
            },
            WarrantyRecord::default(),
        ];
        let base: Vec<&WarrantyRecord> = records.iter().collect();
        let backend = BackendKpis {
            todays_due: Some(BackendKpi {
                count: 11,
                as_of: None,
            }),
            first_followups: None,
        };
        let snapshot = KpiSnapshot::compute(&base, &backend, &clock());
        assert_eq!(snapshot.value(KpiKind::Total), 3);
        assert_eq!(snapshot.value(KpiKind::RegistrationsToday), 1);
        assert_eq!(snapshot.value(KpiKind::CardsSent), 2);
        assert_eq!(snapshot.value(KpiKind::ReviewPending), 1);
        assert_eq!(snapshot.value(KpiKind::ReviewsWon), 1);
        assert_eq!(snapshot.value(KpiKind::TodaysDue), 11);
        assert_eq!(snapshot.value(KpiKind::FirstFollowups), 0);
        assert_eq!(snapshot.description(KpiKind::TodaysDue), "due today");
    }

    #[test]
    fn selecting_a_kpi_replaces_the_other_filters() {
        let mut query = TableQuery {
            search: "W-1".to_string(),
            ad_hoc: Some(AdHocFilter::ReviewPending),
            ..Default::default()
        };
        assert!(select_kpi(&mut query, KpiKind::TodaysDue));
        assert_eq!(query.ad_hoc, Some(AdHocFilter::DueToday));
        assert!(query.search.is_empty());
        assert_eq!(active_kpi(&query), Some(KpiKind::TodaysDue));

        assert!(!select_kpi(&mut query, KpiKind::CardsSent));
        assert_eq!(query.ad_hoc, Some(AdHocFilter::DueToday));

        assert!(select_kpi(&mut query, KpiKind::Total));
        assert_eq!(query.ad_hoc, None);
    }

    #[test]
    fn search_narrows_kpi_base() {
        let records = vec![
            WarrantyRecord {
                warranty_id: "A".to_string(),
                ..Default::default()
            },
            WarrantyRecord {
                warranty_id: "B".to_string(),
                ..Default::default()
            },
        ];
        let scoped: Vec<&WarrantyRecord> = records.iter().collect();
        assert_eq!(kpi_base(&scoped, "B").len(), 1);
        assert_eq!(kpi_base(&scoped, " ").len(), 2);
    }
}
