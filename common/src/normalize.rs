//! Parsing boundary between untyped backend rows and `WarrantyRecord`.
//!
//! The spreadsheet backend returns rows in two key conventions (camelCase and
//! the sheet's PascalCase headers) and encodes dates as ISO strings, epoch
//! milliseconds, or `{seconds, nanoseconds}` timestamp objects. Every field is
//! resolved independently: canonical key first, then the legacy keys, then
//! the default. Nothing in this module panics or returns an error for a
//! malformed field; it falls back to the default instead.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::model::warranty::{Brand, FollowUpStatus, WarrantyRecord};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses any of the backend date encodings into an instant.
///
/// Strings without an offset are interpreted in the viewer's local zone; a
/// bare `YYYY-MM-DD` is local midnight. Numbers are epoch milliseconds.
/// Returns `None` for anything unparsable.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp_str(text),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(millis) = text.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return local_to_utc(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return local_to_utc(date.and_hms_opt(0, 0, 0)?);
    }
    debug!("Unparsable timestamp {text:?}");
    None
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// `deserialize_with` adapter applying `parse_timestamp` to an optional field.
pub fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

/// Key lookups over one raw row.
struct Row<'a>(&'a Map<String, Value>);

impl<'a> Row<'a> {
    /// First key holding a meaningful value (not null, not a blank string).
    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().filter_map(|key| self.0.get(*key)).find(|value| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
    }

    fn text(&self, keys: &[&str]) -> String {
        match self.first(keys) {
            Some(Value::String(text)) => text.trim().to_string(),
            Some(Value::Number(number)) => number_text(number),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => String::new(),
        }
    }

    fn flag(&self, keys: &[&str]) -> bool {
        match self.first(keys) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(text)) => matches!(
                text.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "done" | "✅" | "✔" | "✓"
            ),
            _ => false,
        }
    }

    fn time(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        self.first(keys).and_then(parse_timestamp)
    }

    fn count(&self, keys: &[&str]) -> Option<u8> {
        let raw = match self.first(keys)? {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if raw.is_finite() && raw >= 0.0 {
            Some(raw.min(3.0) as u8)
        } else {
            None
        }
    }
}

fn number_text(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => (float as i64).to_string(),
        _ => number.to_string(),
    }
}

/// Maps one raw backend row to the canonical record.
pub fn normalize_record(raw: &Map<String, Value>) -> WarrantyRecord {
    let row = Row(raw);

    let id = row.text(&["id", "ID", "Id"]);
    let mut warranty_id = row.text(&["warrantyId", "WarrantyID", "WarrantyId", "warrantyID"]);
    if warranty_id.is_empty() {
        warranty_id = id.clone();
    }

    let brand_text = row.text(&["brand", "Brand"]);
    let brand = Brand::parse(&brand_text);
    if brand.is_none() && !brand_text.is_empty() {
        debug!("Unsupported brand {brand_text:?} on {warranty_id}");
    }

    let feedback_received = row.flag(&["feedbackReceived", "FeedbackReceived"]);
    let followups_done = row.count(&[
        "followupsDone",
        "followUpsDone",
        "FollowupsDone",
        "FollowUpsDone",
    ]);
    let status_text = row.text(&["followUpStatus", "FollowUpStatus"]);
    let mut follow_up_status = FollowUpStatus::parse(&status_text).unwrap_or_default();

    if feedback_received {
        follow_up_status = FollowUpStatus::Completed;
    } else if let Some(count) = followups_done {
        if follow_up_status != FollowUpStatus::Completed {
            follow_up_status = FollowUpStatus::from_count(count);
        }
    }

    WarrantyRecord {
        id,
        warranty_id,
        timestamp: row.time(&["timestamp", "Timestamp"]),
        brand,
        customer_name: row.text(&["customerName", "CustomerName", "Name", "name"]),
        email: row.text(&["email", "Email"]),
        phone: row.text(&["phone", "Phone", "Mobile", "mobile"]),
        order_id: row.text(&["orderId", "OrderID", "OrderId"]),
        product: row.text(&["product", "Product"]),
        purchased_from: row.text(&["purchasedFrom", "PurchasedFrom"]),
        status: row.text(&["status", "Status"]),
        last_remark: row.text(&["lastRemark", "LastRemark", "Remark"]),
        next_follow_up: row.time(&["nextFollowUp", "NextFollowUp"]),
        assigned_agent: row.text(&["assignedAgent", "AssignedTo", "assignedTo", "AssignedAgent"]),
        last_updated_on: row.time(&["lastUpdatedOn", "LastUpdatedOn"]),
        warranty_card_url: row.text(&["warrantyCardUrl", "WarrantyCardUrl", "WarrantyCardURL"]),
        source_key: row.text(&["sourceKey", "SourceKey"]),
        sku: row.text(&["sku", "SKU", "Sku"]),
        nry24: row.text(&["nry24", "NRY24"]),
        warranty_card_sent: row.flag(&["warrantyCardSent", "WarrantyCardSent"]),
        feedback_received,
        extended_warranty_sent: row.flag(&["extendedWarrantySent", "ExtendedWarrantySent"]),
        follow_up_status,
        followups_done,
    }
}

/// Normalizes a single untyped value; non-objects are rejected.
pub fn normalize_value(raw: &Value) -> Option<WarrantyRecord> {
    raw.as_object().map(normalize_record)
}

/// Normalizes a `listWarranties` payload, skipping entries that are not rows.
pub fn normalize_rows(raw: &Value) -> Vec<WarrantyRecord> {
    let Some(rows) = raw.as_array() else {
        warn!("Expected an array of rows, got {}", kind_of(raw));
        return Vec::new();
    };
    let records: Vec<WarrantyRecord> = rows.iter().filter_map(normalize_value).collect();
    if records.len() != rows.len() {
        warn!("Skipped {} non-object rows", rows.len() - records.len());
    }
    records
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
