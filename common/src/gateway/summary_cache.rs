//! Short-lived cache of follow-up summaries with in-flight de-duplication.
//!
//! Table rows ask for their summary as they render, so the same ids are
//! requested many times within a few milliseconds. Fresh entries are served
//! from memory; the remaining ids are fetched in one batch, and a batch for
//! an identical (sorted) id set that is already on the wire is awaited
//! instead of being sent again.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use log::debug;

use crate::error::DashboardError;
use crate::model::followup::FollowUpSummary;

pub const SUMMARY_TTL_SECS: i64 = 60;

pub type SummaryMap = HashMap<String, FollowUpSummary>;
type BatchResult = Result<Rc<SummaryMap>, DashboardError>;
type InFlight = Shared<LocalBoxFuture<'static, BatchResult>>;

struct Entry {
    summary: FollowUpSummary,
    expires: DateTime<Utc>,
}

pub struct SummaryCache {
    ttl: Duration,
    entries: RefCell<HashMap<String, Entry>>,
    in_flight: RefCell<HashMap<String, InFlight>>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        SummaryCache::new(Duration::seconds(SUMMARY_TTL_SECS))
    }
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        SummaryCache {
            ttl,
            entries: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    /// Fresh cached summary for one id.
    pub fn cached(&self, id: &str, now: DateTime<Utc>) -> Option<FollowUpSummary> {
        self.entries
            .borrow()
            .get(id)
            .filter(|entry| entry.expires > now)
            .map(|entry| entry.summary.clone())
    }

    /// Drops entries so the next lookup refetches them.
    pub fn invalidate(&self, ids: &[&str]) {
        let mut entries = self.entries.borrow_mut();
        for id in ids {
            entries.remove(*id);
        }
    }

    /// Summaries for `ids`, fetching only the ids without a fresh entry.
    ///
    /// `fetch` receives the missing ids and is only called when no identical
    /// batch is in flight. `clock` stamps the expiry after the fetch
    /// completes. Ids absent from the backend answer are absent from the
    /// result.
    pub async fn get_batch<F, C>(
        &self,
        ids: &[String],
        clock: C,
        fetch: F,
    ) -> Result<SummaryMap, DashboardError>
    where
        F: FnOnce(Vec<String>) -> LocalBoxFuture<'static, Result<SummaryMap, DashboardError>>,
        C: Fn() -> DateTime<Utc>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = ids
            .iter()
            .filter(|id| !id.is_empty() && seen.insert(id.as_str()))
            .collect();

        let now = clock();
        let mut result = SummaryMap::new();
        let mut missing = Vec::new();
        for id in unique {
            match self.cached(id, now) {
                Some(summary) => {
                    result.insert(id.clone(), summary);
                }
                None => missing.push(id.clone()),
            }
        }
        if missing.is_empty() {
            debug!("Summary cache hit for {} ids", result.len());
            return Ok(result);
        }

        let mut sorted = missing.clone();
        sorted.sort();
        let key = sorted.join(",");

        let existing = self.in_flight.borrow().get(&key).cloned();
        let pending = match existing {
            Some(pending) => {
                debug!("Joining in-flight summary batch {key}");
                pending
            }
            None => {
                debug!("Fetching summaries for {key}");
                let pending = fetch(missing.clone())
                    .map(|fetched| fetched.map(Rc::new))
                    .boxed_local()
                    .shared();
                self.in_flight
                    .borrow_mut()
                    .insert(key.clone(), pending.clone());
                pending
            }
        };

        let outcome = pending.await;
        self.in_flight.borrow_mut().remove(&key);
        let fetched = outcome?;

        // Only the ids this batch asked for are cached; extra ids in the
        // answer are ignored.
        let expires = clock() + self.ttl;
        let mut entries = self.entries.borrow_mut();
        for id in missing {
            if let Some(summary) = fetched.get(&id) {
                let summary = summary.clone().sanitized();
                entries.insert(
                    id.clone(),
                    Entry {
                        summary: summary.clone(),
                        expires,
                    },
                );
                result.insert(id, summary);
            }
        }
        Ok(result)
    }
}
