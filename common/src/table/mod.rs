//! Client-side table pipeline.
//!
//! The rows shown for a page are produced in a fixed order:
//!
//! 1. column filters (`ColumnFilters::matches`)
//! 2. warranty-id search
//! 3. computed filters (due today, the active KPI filter)
//! 4. stable sort
//! 5. pagination
//!
//! Before the pipeline the list is narrowed by the dashboard `Scope`
//! (date range and brand selector). KPIs are computed over the scoped and
//! searched list, see `crate::kpi`.

pub mod filters;
pub mod paging;
pub mod sort;

use crate::dates::DateRange;
use crate::model::warranty::{Brand, WarrantyRecord};

pub use filters::{
    AdHocFilter, Clock, ColumnFilters, DoneFilter, FlagFilter, Summaries, search_matches,
};
pub use paging::{PAGE_SIZE, Pager, total_pages};
pub use sort::{SortDirection, SortField, SortState, sort_rows};

/// Date range and brand selected in the dashboard header.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub range: DateRange,
    pub brand: Option<Brand>,
}

impl Scope {
    /// Records without a registration time are always in range.
    pub fn contains(&self, record: &WarrantyRecord) -> bool {
        record
            .timestamp
            .is_none_or(|registered| self.range.contains(registered))
            && self.brand.is_none_or(|brand| record.brand == Some(brand))
    }

    pub fn apply<'a>(&self, records: &'a [WarrantyRecord]) -> Vec<&'a WarrantyRecord> {
        records.iter().filter(|record| self.contains(record)).collect()
    }
}

/// Everything the user can change about the table besides the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    pub filters: ColumnFilters,
    /// Submitted warranty id; blank means no search.
    pub search: String,
    pub ad_hoc: Option<AdHocFilter>,
    pub sort: SortState,
}

impl TableQuery {
    /// Drops the KPI filter; used when the brand or the search changes.
    pub fn clear_ad_hoc(&mut self) {
        self.ad_hoc = None;
    }
}

/// One rendered page of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a> {
    pub rows: Vec<&'a WarrantyRecord>,
    /// Rows matching the query across all pages.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Steps 1-4: filters, search, computed filters and sort.
pub fn filter_and_sort<'a>(
    scoped: &[&'a WarrantyRecord],
    query: &TableQuery,
    clock: &Clock,
    summaries: &Summaries,
) -> Vec<&'a WarrantyRecord> {
    let mut rows: Vec<&'a WarrantyRecord> = scoped
        .iter()
        .copied()
        .filter(|record| {
            query
                .filters
                .matches(record, summaries.get(&record.warranty_id))
        })
        .filter(|record| search_matches(record, &query.search))
        .filter(|record| query.filters.due_today.matches(record.is_due_on(clock.today)))
        .filter(|record| {
            query
                .ad_hoc
                .is_none_or(|filter| filter.matches(record, clock))
        })
        .collect();
    sort_rows(&mut rows, &query.sort, summaries);
    rows
}

/// Full pipeline including pagination. Updates `pager` with the new total.
pub fn run_pipeline<'a>(
    scoped: &[&'a WarrantyRecord],
    query: &TableQuery,
    clock: &Clock,
    summaries: &Summaries,
    pager: &mut Pager,
) -> TableView<'a> {
    let rows = filter_and_sort(scoped, query, clock, summaries);
    pager.observe(rows.len());
    TableView {
        total: rows.len(),
        page: pager.page(),
        total_pages: total_pages(rows.len(), pager.page_size()),
        rows: pager.slice(&rows).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(id: &str) -> WarrantyRecord {
        WarrantyRecord {
            warranty_id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn due_today_includes_any_time_today_only() {
        let clock = Clock::for_day(day(2024, 6, 10));
        let mut morning = record("morning");
        morning.next_follow_up = Some(local(2024, 6, 10, 0, 5));
        let mut night = record("night");
        night.next_follow_up = Some(local(2024, 6, 10, 23, 50));
        let mut yesterday = record("yesterday");
        yesterday.next_follow_up = Some(local(2024, 6, 9, 23, 59));
        let mut reviewed = record("reviewed");
        reviewed.next_follow_up = Some(local(2024, 6, 10, 12, 0));
        reviewed.feedback_received = true;

        let records = vec![morning, night, yesterday, reviewed];
        let scoped: Vec<&WarrantyRecord> = records.iter().collect();
        let query = TableQuery {
            ad_hoc: Some(AdHocFilter::DueToday),
            ..Default::default()
        };
        let rows = filter_and_sort(&scoped, &query, &clock, &Summaries::new());
        let ids: Vec<&str> = rows.iter().map(|r| r.warranty_id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"morning") && ids.contains(&"night"));

        let query = TableQuery {
            filters: ColumnFilters {
                due_today: FlagFilter::No,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            filter_and_sort(&scoped, &query, &clock, &Summaries::new()).len(),
            2
        );
    }

    #[test]
    fn pipeline_paginates_filtered_rows() {
        let base = local(2024, 1, 1, 9, 0);
        let records: Vec<WarrantyRecord> = (0..125)
            .map(|i| WarrantyRecord {
                warranty_id: format!("W-{i}"),
                timestamp: Some(base + Duration::minutes(i)),
                brand: Some(if i % 5 == 0 { Brand::Drogo } else { Brand::Baybee }),
                ..Default::default()
            })
            .collect();
        let scoped: Vec<&WarrantyRecord> = records.iter().collect();
        let clock = Clock::for_day(day(2024, 1, 1));
        let mut pager = Pager::default();

        let view = run_pipeline(&scoped, &TableQuery::default(), &clock, &Summaries::new(), &mut pager);
        assert_eq!((view.total, view.total_pages, view.rows.len()), (125, 3, 50));
        assert_eq!(view.rows[0].warranty_id, "W-124");

        pager.go_to(3);
        let view = run_pipeline(&scoped, &TableQuery::default(), &clock, &Summaries::new(), &mut pager);
        assert_eq!((view.page, view.rows.len()), (3, 25));

        let query = TableQuery {
            filters: ColumnFilters {
                brand: Some(Brand::Drogo),
                ..Default::default()
            },
            ..Default::default()
        };
        let view = run_pipeline(&scoped, &query, &clock, &Summaries::new(), &mut pager);
        assert_eq!((view.total, view.page, view.total_pages), (25, 1, 1));
    }

    #[test]
    fn scope_keeps_undated_records() {
        let records = vec![
            WarrantyRecord {
                timestamp: Some(local(2024, 6, 5, 10, 0)),
                brand: Some(Brand::Baybee),
                ..record("in")
            },
            WarrantyRecord {
                timestamp: Some(local(2024, 5, 1, 10, 0)),
                brand: Some(Brand::Baybee),
                ..record("out")
            },
            WarrantyRecord {
                brand: Some(Brand::Baybee),
                ..record("undated")
            },
            WarrantyRecord {
                timestamp: Some(local(2024, 6, 5, 10, 0)),
                brand: Some(Brand::Domestica),
                ..record("other-brand")
            },
        ];
        let scope = Scope {
            range: DateRange::days(day(2024, 6, 1), day(2024, 6, 10)),
            brand: Some(Brand::Baybee),
        };
        let ids: Vec<&str> = scope
            .apply(&records)
            .iter()
            .map(|r| r.warranty_id.as_str())
            .collect();
        assert_eq!(ids, vec!["in", "undated"]);
    }
}
