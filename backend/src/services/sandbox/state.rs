//! In-memory registration sheet and follow-up log behind the sandbox.
//!
//! `SandboxState` is cloned into every Actix worker as `web::Data`; the
//! `RwLock` serializes writes so stage transitions stay ordered.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::dates::local_day;
use common::error::DashboardError;
use common::model::warranty::WarrantyRecord;
use common::normalize::normalize_rows;
use common::workflow::{FollowUpBook, WorkflowState};
use log::{info, warn};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct SandboxState {
    pub sandbox: Arc<RwLock<Sandbox>>,
}

impl SandboxState {
    pub fn new(sandbox: Sandbox) -> Self {
        SandboxState {
            sandbox: Arc::new(RwLock::new(sandbox)),
        }
    }
}

/// Registration rows plus the workflow engine that owns their follow-ups.
#[derive(Debug, Default)]
pub struct Sandbox {
    /// Expected `token` parameter; empty accepts any caller.
    pub(crate) token: String,
    pub(crate) records: Vec<WarrantyRecord>,
    pub(crate) book: FollowUpBook,
}

impl Sandbox {
    pub fn new(token: &str) -> Self {
        Sandbox {
            token: token.to_string(),
            ..Default::default()
        }
    }

    /// Adds a registration and starts tracking its follow-ups. Rows without
    /// a warranty id are skipped; a duplicate id replaces the stored row.
    pub fn insert(&mut self, record: WarrantyRecord) {
        if record.warranty_id.is_empty() {
            warn!("Skipping sandbox row without warrantyId (id {:?})", record.id);
            return;
        }
        let state = WorkflowState::from_record(&record, None);
        self.book
            .register(&record.warranty_id, state, record.next_follow_up);
        match self
            .records
            .iter_mut()
            .find(|existing| existing.warranty_id == record.warranty_id)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Parses a JSON array of raw sheet rows in either casing convention.
    pub fn seed_from_str(&mut self, raw: &str) -> Result<usize, DashboardError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| DashboardError::InvalidJson(format!("sandbox seed: {}", e)))?;
        let rows = normalize_rows(&value);
        let count = rows.len();
        for record in rows {
            self.insert(record);
        }
        Ok(count)
    }

    pub fn seed_from_file(&mut self, path: &Path) -> Result<usize, DashboardError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("cannot read seed {}: {}", path.display(), e))
        })?;
        let count = self.seed_from_str(&raw)?;
        info!("Seeded sandbox with {} rows from {}", count, path.display());
        Ok(count)
    }

    pub(crate) fn record(&self, warranty_id: &str) -> Option<&WarrantyRecord> {
        self.records
            .iter()
            .find(|record| record.warranty_id == warranty_id)
    }

    pub(crate) fn record_mut(
        &mut self,
        warranty_id: &str,
    ) -> Result<&mut WarrantyRecord, DashboardError> {
        self.records
            .iter_mut()
            .find(|record| record.warranty_id == warranty_id)
            .ok_or_else(|| DashboardError::Application(format!("Warranty not found: {}", warranty_id)))
    }

    /// Rows whose next follow-up falls on today's local date, by the same
    /// rule as the dashboard's "due today" filter.
    pub(crate) fn due_today(&self, now: DateTime<Utc>) -> impl Iterator<Item = &WarrantyRecord> {
        let today = local_day(now);
        self.records.iter().filter(move |record| record.is_due_on(today))
    }

    /// Mirrors the engine's view of one warranty back into its row.
    pub(crate) fn sync_record(&mut self, warranty_id: &str, now: DateTime<Utc>) {
        let state = self.book.state(warranty_id);
        let summary = self.book.summary(warranty_id);
        let next_due = self.book.next_due(warranty_id);
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.warranty_id == warranty_id)
        {
            if let Some(state) = state {
                record.follow_up_status = state.status();
                if state.is_terminal() {
                    record.feedback_received = true;
                }
            }
            if let Some(summary) = summary {
                record.followups_done = Some(summary.count);
            }
            record.next_follow_up = next_due;
            record.last_updated_on = Some(now);
        }
    }
}
