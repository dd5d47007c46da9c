//! Dashboard state and the derived table page.

use std::collections::HashSet;

use chrono::Local;
use common::dates::DateRange;
use common::error::DashboardError;
use common::gateway::summary_cache::SummaryMap;
use common::guard::Generation;
use common::kpi::{kpi_base, BackendKpis, KpiSnapshot};
use common::model::warranty::{Brand, WarrantyRecord};
use common::table::{run_pipeline, Clock, Pager, Scope, Summaries, TableQuery};
use log::warn;

pub struct DashboardComponent {
    /// Rows of the last successful `listWarranties` call.
    pub records: Vec<WarrantyRecord>,
    pub loading: bool,
    pub load_error: Option<String>,

    pub range: DateRange,
    pub brand: Option<Brand>,
    /// Search box contents; only applied on submit.
    pub search_input: String,
    pub query: TableQuery,
    pub pager: Pager,

    pub summaries: Summaries,
    /// Ids with a summary request in flight.
    pub summary_loading: HashSet<String>,
    /// Ids whose last summary request failed; not retried until the next load.
    pub summary_failed: HashSet<String>,
    pub backend_kpis: BackendKpis,

    pub list_generation: Generation,
    pub kpi_generation: Generation,
    /// One round per list load; every batch of a round shares its ticket.
    pub summary_generation: Generation,
    /// Bumped after every successful save.
    pub refresh_version: u64,

    pub selected: Option<WarrantyRecord>,
    pub emailing: Option<WarrantyRecord>,

    // Derived by `recompute`.
    pub page_rows: Vec<WarrantyRecord>,
    pub total: usize,
    pub total_pages: usize,
    pub kpis: KpiSnapshot,
}

impl DashboardComponent {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            load_error: None,
            range: DateRange::default_window(Local::now().date_naive()),
            brand: None,
            search_input: String::new(),
            query: TableQuery::default(),
            pager: Pager::default(),
            summaries: Summaries::new(),
            summary_loading: HashSet::new(),
            summary_failed: HashSet::new(),
            backend_kpis: BackendKpis::default(),
            list_generation: Generation::new(),
            kpi_generation: Generation::new(),
            summary_generation: Generation::new(),
            refresh_version: 0,
            selected: None,
            emailing: None,
            page_rows: Vec::new(),
            total: 0,
            total_pages: 1,
            kpis: KpiSnapshot::default(),
        }
    }

    pub fn scope(&self) -> Scope {
        Scope {
            range: self.range,
            brand: self.brand,
        }
    }

    /// Re-runs the KPI aggregation and the table pipeline over the loaded
    /// list. KPIs see the scoped and searched rows, never the column or
    /// KPI filters.
    pub fn recompute(&mut self) {
        let clock = Clock::now();
        let scope = self.scope();
        let scoped = scope.apply(&self.records);
        self.kpis = KpiSnapshot::compute(
            &kpi_base(&scoped, &self.query.search),
            &self.backend_kpis,
            &clock,
        );
        let view = run_pipeline(&scoped, &self.query, &clock, &self.summaries, &mut self.pager);
        self.total = view.total;
        self.total_pages = view.total_pages;
        self.page_rows = view.rows.into_iter().cloned().collect();
    }

    /// Visible rows whose follow-up count still has to come from a summary.
    pub fn missing_summaries(&self) -> Vec<String> {
        self.page_rows
            .iter()
            .filter(|record| record.followups_done.is_none() && !record.feedback_received)
            .map(|record| record.warranty_id.clone())
            .filter(|id| {
                !id.is_empty()
                    && !self.summaries.contains_key(id)
                    && !self.summary_loading.contains(id)
                    && !self.summary_failed.contains(id)
            })
            .collect()
    }

    /// Starts a new summary round. Batches still in flight become stale and
    /// their ids may be requested again.
    pub fn reset_summaries(&mut self) {
        self.summary_generation.invalidate();
        self.summary_loading.clear();
        self.summary_failed.clear();
    }

    /// Marks `ids` as in flight and returns the ticket their batch carries.
    pub fn begin_summaries(&mut self, ids: &[String]) -> u64 {
        self.summary_loading.extend(ids.iter().cloned());
        self.summary_generation.current()
    }

    /// Applies one batch answer. Answers from an earlier round are dropped
    /// untouched and `false` is returned.
    pub fn apply_summaries(
        &mut self,
        ticket: u64,
        ids: Vec<String>,
        result: Result<SummaryMap, DashboardError>,
    ) -> bool {
        if !self.summary_generation.is_current(ticket) {
            return false;
        }
        for id in &ids {
            self.summary_loading.remove(id);
        }
        match result {
            Ok(map) => {
                let unanswered = ids.iter().filter(|id| !map.contains_key(*id)).cloned();
                self.summary_failed.extend(unanswered);
                self.summaries.extend(map);
            }
            Err(e) => {
                warn!("Follow-up summaries unavailable: {}", e);
                self.summary_failed.extend(ids);
            }
        }
        true
    }
}
