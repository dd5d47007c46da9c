//! Calendar-day helpers and the date-range presets of the dashboard picker.
//!
//! All day boundaries are evaluated in the viewer's local time zone. Preset
//! math works on calendar days rather than fixed 24h offsets so ranges stay
//! correct across DST changes.

use std::fmt;

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Width of the default dashboard window.
pub const DEFAULT_WINDOW_DAYS: u64 = 730;

fn local_instant(day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = day.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// 00:00:00.000 local time on `day`.
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    local_instant(day, NaiveTime::MIN)
}

/// 23:59:59.999 local time on `day`.
pub fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    local_instant(day, time)
}

/// Local calendar day of an instant.
pub fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Inclusive range of whole local days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Range covering `first..=last`; the bounds are swapped if reversed.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        DateRange {
            from: start_of_day(first),
            to: end_of_day(last),
        }
    }

    /// Snaps arbitrary instants to the surrounding day boundaries.
    pub fn normalized(&self) -> Self {
        DateRange::days(local_day(self.from), local_day(self.to))
    }

    /// Last `DEFAULT_WINDOW_DAYS` days ending today.
    pub fn default_window(today: NaiveDate) -> Self {
        let first = today
            .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
            .unwrap_or(today);
        DateRange::days(first, today)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }

    pub fn first_day(&self) -> NaiveDate {
        local_day(self.from)
    }

    pub fn last_day(&self) -> NaiveDate {
        local_day(self.to)
    }

    /// Number of calendar days covered, counting both ends.
    pub fn inclusive_days(&self) -> i64 {
        (self.last_day() - self.first_day()).num_days() + 1
    }
}

/// Named shortcuts offered by the range picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    Last90Days,
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Today,
        Preset::Yesterday,
        Preset::Last7Days,
        Preset::Last30Days,
        Preset::Last90Days,
        Preset::Custom,
    ];

    /// Stable identifier used as the `<select>` option value.
    pub fn key(&self) -> &'static str {
        match self {
            Preset::Today => "today",
            Preset::Yesterday => "yesterday",
            Preset::Last7Days => "7days",
            Preset::Last30Days => "30days",
            Preset::Last90Days => "90days",
            Preset::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Today => "Today",
            Preset::Yesterday => "Yesterday",
            Preset::Last7Days => "Last 7 days",
            Preset::Last30Days => "Last 30 days",
            Preset::Last90Days => "Last 90 days",
            Preset::Custom => "Custom Range",
        }
    }

    pub fn from_key(key: &str) -> Option<Preset> {
        Preset::ALL.into_iter().find(|preset| preset.key() == key)
    }

    /// Trailing window length for the "last N days" presets, today included.
    fn trailing_days(&self) -> Option<u64> {
        match self {
            Preset::Today => Some(1),
            Preset::Last7Days => Some(7),
            Preset::Last30Days => Some(30),
            Preset::Last90Days => Some(90),
            Preset::Yesterday | Preset::Custom => None,
        }
    }

    /// Concrete range for this preset; `None` for `Custom`.
    pub fn range(&self, today: NaiveDate) -> Option<DateRange> {
        if let Some(days) = self.trailing_days() {
            let first = today.checked_sub_days(Days::new(days - 1))?;
            return Some(DateRange::days(first, today));
        }
        match self {
            Preset::Yesterday => {
                let yesterday = today.pred_opt()?;
                Some(DateRange::days(yesterday, yesterday))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which preset, if any, a range corresponds to relative to `today`.
pub fn detect_preset(range: &DateRange, today: NaiveDate) -> Preset {
    let range = range.normalized();
    if range.last_day() == today {
        let days = range.inclusive_days();
        if let Some(preset) = Preset::ALL
            .into_iter()
            .find(|preset| preset.trailing_days() == Some(days as u64))
        {
            return preset;
        }
    }
    if today.pred_opt().is_some_and(|yesterday| {
        range.first_day() == yesterday && range.last_day() == yesterday
    }) {
        return Preset::Yesterday;
    }
    Preset::Custom
}

/// Button caption: the preset label, or `dd/mm/yyyy - dd/mm/yyyy`.
pub fn describe_range(range: &DateRange, today: NaiveDate) -> String {
    match detect_preset(range, today) {
        Preset::Custom => format!(
            "{} - {}",
            range.first_day().format("%d/%m/%Y"),
            range.last_day().format("%d/%m/%Y")
        ),
        preset => preset.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn every_named_preset_is_detected_from_its_range() {
        let today = day(2024, 6, 10);
        for preset in Preset::ALL {
            if let Some(range) = preset.range(today) {
                assert_eq!(detect_preset(&range, today), preset, "{preset}");
            }
        }
        assert_eq!(Preset::Custom.range(today), None);
    }

    #[test]
    fn last_seven_days_on_fixed_date() {
        let range = Preset::Last7Days.range(day(2024, 6, 10)).unwrap();
        let from = Local
            .with_ymd_and_hms(2024, 6, 4, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let to = Local
            .from_local_datetime(
                &day(2024, 6, 10)
                    .and_hms_milli_opt(23, 59, 59, 999)
                    .unwrap(),
            )
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(range.from, from);
        assert_eq!(range.to, to);
        assert_eq!(range.inclusive_days(), 7);
    }

    #[test]
    fn ranges_are_normalized_and_inclusive() {
        let today = day(2024, 6, 10);
        let noon = Local.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap().with_timezone(&Utc);
        let range = DateRange { from: noon, to: noon }.normalized();
        assert_eq!(range, DateRange::days(day(2024, 6, 3), day(2024, 6, 3)));
        assert!(range.contains(start_of_day(day(2024, 6, 3))));
        assert!(range.contains(end_of_day(day(2024, 6, 3))));
        assert!(!range.contains(start_of_day(day(2024, 6, 4))));

        let swapped = DateRange::days(day(2024, 6, 9), day(2024, 6, 1));
        assert_eq!(swapped.first_day(), day(2024, 6, 1));
        assert_eq!(detect_preset(&swapped, today), Preset::Custom);
        assert_eq!(describe_range(&swapped, today), "01/06/2024 - 09/06/2024");
    }

    #[test]
    fn yesterday_is_not_mistaken_for_today() {
        let today = day(2024, 3, 1);
        let range = DateRange::days(day(2024, 2, 29), day(2024, 2, 29));
        assert_eq!(detect_preset(&range, today), Preset::Yesterday);
        assert_eq!(describe_range(&range, today), "Yesterday");
    }

    #[test]
    fn default_window_spans_two_years() {
        let range = DateRange::default_window(day(2024, 6, 10));
        assert_eq!(range.inclusive_days(), DEFAULT_WINDOW_DAYS as i64 + 1);
        assert_eq!(range.last_day(), day(2024, 6, 10));
    }
}
