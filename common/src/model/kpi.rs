use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::de_timestamp;

/// Count aggregated by the backend, with the time it was computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendKpi {
    #[serde(default)]
    pub count: u64,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub as_of: Option<DateTime<Utc>>,
}
