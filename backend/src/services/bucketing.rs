//! Time-bucketing engine.
//!
//! Every report is built from one fixed-granularity intermediate: counts per
//! UTC hour ([`HourlyCounts`]). Daily, weekly and monthly trends are always
//! derived from that map directly, never from each other, so re-bucketing
//! can neither drop nor double-count an event.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use super::{ServiceError, ServiceResult};

/// Label format of one hourly bucket, e.g. `2024-03-04 10:00:00`.
pub const HOUR_KEY_FORMAT: &str = "%Y-%m-%d %H:00:00";

const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_FORMAT: &str = "%Y-%m";

/// Requested bucket width of a trend report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl FromStr for Granularity {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(Granularity::as_str).collect();
                ServiceError::invalid(format!(
                    "Invalid granularity. Choose from {}",
                    names.join(", ")
                ))
            })
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truncate an instant to the start of its hour.
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    NaiveDateTime::new(ts.date(), NaiveTime::MIN) + Duration::hours(i64::from(ts.hour()))
}

pub fn hour_label(hour: NaiveDateTime) -> String {
    hour.format(HOUR_KEY_FORMAT).to_string()
}

/// Event counts per UTC hour.
///
/// Keys are always hour-truncated, so two events in the same hour collapse
/// into one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourlyCounts {
    counts: HashMap<NaiveDateTime, u64>,
}

impl HourlyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event at `ts`.
    pub fn record(&mut self, ts: NaiveDateTime) {
        self.add(ts, 1);
    }

    pub fn add(&mut self, ts: NaiveDateTime, count: u64) {
        *self.counts.entry(truncate_to_hour(ts)).or_insert(0) += count;
    }

    /// Build from `(label, count)` pairs where each label is a
    /// `YYYY-MM-DD HH:MM:SS` instant.
    pub fn from_labels<I, S>(pairs: I) -> ServiceResult<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut counts = Self::new();
        for (label, count) in pairs {
            let label = label.as_ref();
            let ts = NaiveDateTime::parse_from_str(label, "%Y-%m-%d %H:%M:%S").map_err(|_| {
                ServiceError::invalid(format!("Invalid hour key '{}'", label))
            })?;
            counts.add(ts, count);
        }
        Ok(counts)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct hours with at least one event.
    pub fn active_hours(&self) -> usize {
        self.counts.values().filter(|&&c| c > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, u64)> + '_ {
        self.counts.iter().map(|(hour, count)| (*hour, *count))
    }
}

/// One output row of a trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
}

/// Label of the bucket that `hour` falls into.
pub fn bucket_label(hour: NaiveDateTime, granularity: Granularity) -> String {
    let date = hour.date();
    match granularity {
        Granularity::Hourly => hour_label(hour),
        Granularity::Daily => date.format(DATE_FORMAT).to_string(),
        Granularity::Weekly => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.format(DATE_FORMAT).to_string()
        }
        Granularity::Monthly => date.format(MONTH_FORMAT).to_string(),
    }
}

/// Re-bucket hourly counts at `granularity`.
///
/// Only buckets with events are emitted. Daily, weekly and monthly output is
/// ascending by label; hourly output is in map order and callers must not
/// rely on it being sorted.
pub fn aggregate(hourly: &HourlyCounts, granularity: Granularity) -> Vec<TrendPoint> {
    if granularity == Granularity::Hourly {
        return hourly
            .iter()
            .map(|(hour, count)| TrendPoint {
                date: hour_label(hour),
                count,
            })
            .collect();
    }

    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for (hour, count) in hourly.iter() {
        *buckets.entry(bucket_label(hour, granularity)).or_insert(0) += count;
    }
    buckets
        .into_iter()
        .map(|(date, count)| TrendPoint { date, count })
        .collect()
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summary statistics of a usage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStatistics {
    pub avg_videos_per_hour: f64,
    pub max_videos_in_period: u64,
    pub min_videos_in_period: u64,
    pub total_active_hours: usize,
    pub workspace_utilization: f64,
}

impl UsageStatistics {
    /// Derive statistics from the hourly map, the emitted trend, and the
    /// number of hours in the queried window.
    pub fn compute(hourly: &HourlyCounts, trend: &[TrendPoint], total_hours: i64) -> Self {
        let active_hours = hourly.active_hours();
        let (avg, utilization) = if total_hours > 0 {
            let hours = total_hours as f64;
            (
                round2(hourly.total() as f64 / hours),
                round2(active_hours as f64 / hours * 100.0),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            avg_videos_per_hour: avg,
            max_videos_in_period: trend.iter().map(|p| p.count).max().unwrap_or(0),
            min_videos_in_period: trend.iter().map(|p| p.count).min().unwrap_or(0),
            total_active_hours: active_hours,
            workspace_utilization: utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    fn sample() -> HourlyCounts {
        HourlyCounts::from_labels([
            ("2024-03-04 10:00:00", 3),
            ("2024-03-04 14:00:00", 2),
            ("2024-03-05 09:00:00", 1),
        ])
        .unwrap()
    }

    fn wide_sample() -> HourlyCounts {
        HourlyCounts::from_labels([
            ("2024-01-31 23:00:00", 4),
            ("2024-02-01 00:00:00", 1),
            ("2024-02-04 12:00:00", 2),
            ("2024-02-05 08:00:00", 7),
            ("2024-02-29 17:00:00", 1),
            ("2024-03-10 06:00:00", 5),
            ("2024-12-30 01:00:00", 2),
            ("2025-01-01 00:00:00", 3),
        ])
        .unwrap()
    }

    fn point(date: &str, count: u64) -> TrendPoint {
        TrendPoint {
            date: date.to_string(),
            count,
        }
    }

    #[test]
    fn test_daily_scenario() {
        assert_eq!(
            aggregate(&sample(), Granularity::Daily),
            vec![point("2024-03-04", 5), point("2024-03-05", 1)]
        );
    }

    #[test]
    fn test_weekly_scenario() {
        assert_eq!(
            aggregate(&sample(), Granularity::Weekly),
            vec![point("2024-03-04", 6)]
        );
    }

    #[test]
    fn test_monthly_matches_daily_grouped_by_month() {
        let hourly = wide_sample();
        let mut expected: BTreeMap<String, u64> = BTreeMap::new();
        for p in aggregate(&hourly, Granularity::Daily) {
            *expected.entry(p.date[..7].to_string()).or_insert(0) += p.count;
        }
        let expected: Vec<TrendPoint> = expected
            .into_iter()
            .map(|(date, count)| TrendPoint { date, count })
            .collect();

        assert_eq!(aggregate(&hourly, Granularity::Monthly), expected);
    }

    #[test]
    fn test_conservation_for_every_granularity() {
        for hourly in [sample(), wide_sample(), HourlyCounts::new()] {
            for g in Granularity::ALL {
                let total: u64 = aggregate(&hourly, g).iter().map(|p| p.count).sum();
                assert_eq!(total, hourly.total(), "granularity {}", g);
            }
        }
    }

    #[test]
    fn test_weekly_labels_are_mondays() {
        let weekly = aggregate(&wide_sample(), Granularity::Weekly);
        assert!(!weekly.is_empty());
        for p in weekly {
            let date = NaiveDate::parse_from_str(&p.date, "%Y-%m-%d").unwrap();
            assert_eq!(date.weekday(), Weekday::Mon, "{}", p.date);
        }
    }

    #[test]
    fn test_weekly_crosses_year_boundary() {
        // 2024-12-30 is a Monday; 2025-01-01 belongs to the same week.
        let weekly = aggregate(&wide_sample(), Granularity::Weekly);
        assert_eq!(weekly.last(), Some(&point("2024-12-30", 5)));
    }

    #[test]
    fn test_hourly_passthrough() {
        let mut hourly = aggregate(&sample(), Granularity::Hourly);
        hourly.sort_by(|a, b| a.date.cmp(&b.date));
        assert_eq!(
            hourly,
            vec![
                point("2024-03-04 10:00:00", 3),
                point("2024-03-04 14:00:00", 2),
                point("2024-03-05 09:00:00", 1),
            ]
        );
    }

    #[test]
    fn test_same_hour_collapses() {
        let mut hourly = HourlyCounts::new();
        let base = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        hourly.record(base.and_hms_opt(10, 5, 0).unwrap());
        hourly.record(base.and_hms_milli_opt(10, 59, 59, 999).unwrap());
        hourly.record(base.and_hms_opt(11, 0, 0).unwrap());

        assert_eq!(hourly.active_hours(), 2);
        assert_eq!(hourly.total(), 3);
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("weekly".parse::<Granularity>().unwrap(), Granularity::Weekly);
        let err = "yearly".parse::<Granularity>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid granularity. Choose from hourly, daily, weekly, monthly"
        );
        assert!("Daily".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_from_labels_rejects_garbage() {
        assert!(HourlyCounts::from_labels([("yesterday", 1)]).is_err());
    }

    #[test]
    fn test_statistics() {
        let hourly = sample();
        let trend = aggregate(&hourly, Granularity::Daily);
        let stats = UsageStatistics::compute(&hourly, &trend, 48);

        assert_eq!(stats.avg_videos_per_hour, 0.13);
        assert_eq!(stats.max_videos_in_period, 5);
        assert_eq!(stats.min_videos_in_period, 1);
        assert_eq!(stats.total_active_hours, 3);
        assert_eq!(stats.workspace_utilization, 6.25);
    }

    #[test]
    fn test_statistics_empty_window() {
        let stats = UsageStatistics::compute(&HourlyCounts::new(), &[], 0);
        assert_eq!(stats.avg_videos_per_hour, 0.0);
        assert_eq!(stats.max_videos_in_period, 0);
        assert_eq!(stats.min_videos_in_period, 0);
        assert_eq!(stats.workspace_utilization, 0.0);
    }
}
