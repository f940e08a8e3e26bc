//! Usage summary across all workspaces.
//!
//! Embedded lineup entries are counted under any creation-time alias
//! (`created_at`, `createdAt`, `creation_date`), not only `created_at`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::bucketing::{aggregate, truncate_to_hour, Granularity, HourlyCounts, TrendPoint, UsageStatistics};
use super::{ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{normalize_creation_time, RawVideoRecord, WorkspaceDocument};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated parameters of a usage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageQuery {
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub granularity: Granularity,
    /// Day after `end_date`, the exclusive bound of the window.
    end_exclusive: NaiveDate,
}

impl UsageQuery {
    /// Parse raw query parameters. The granularity is checked first.
    pub fn parse(start_date: &str, end_date: &str, granularity: &str) -> ServiceResult<Self> {
        let granularity: Granularity = granularity.parse()?;
        let start_date = parse_date(start_date)?;
        let end_date = parse_date(end_date)?;
        if end_date < start_date {
            return Err(ServiceError::invalid("end_date must not be before start_date"));
        }
        let end_exclusive = end_date.succ_opt().ok_or_else(|| {
            ServiceError::invalid(format!("Invalid date '{}'. Date is out of range", end_date))
        })?;
        Ok(Self {
            start_date,
            end_date,
            granularity,
            end_exclusive,
        })
    }

    /// Exclusive-end window `[start 00:00, end + 1 day 00:00)`.
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = NaiveDateTime::new(self.start_date, NaiveTime::MIN);
        let end = NaiveDateTime::new(self.end_exclusive, NaiveTime::MIN);
        (start, end)
    }

    pub fn total_hours(&self) -> i64 {
        let (start, end) = self.window();
        (end - start).num_hours()
    }
}

fn parse_date(value: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ServiceError::invalid(format!("Invalid date '{}'. Use YYYY-MM-DD", value))
    })
}

/// One workspace's events within one hour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourlyBucketKey {
    pub workspace_id: String,
    pub workspace_name: Option<String>,
    pub hour: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub workspace_id: String,
    pub workspace_name: Option<String>,
    pub total_videos: u64,
    /// Distinct hours with at least one event.
    pub active_periods: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceUsage {
    pub start_date: String,
    pub end_date: String,
    pub granularity: Granularity,
    pub total_workspaces: usize,
    pub total_videos: u64,
    pub workspace_summary: Vec<WorkspaceSummary>,
    pub trend_data: Vec<TrendPoint>,
    #[serde(flatten)]
    pub statistics: UsageStatistics,
}

/// Count embedded lineup entries per workspace and hour inside
/// `[start, end)`. Returns the buckets and the number of entries without a
/// usable timestamp.
pub fn hourly_buckets(
    workspaces: &[WorkspaceDocument],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> (HashMap<HourlyBucketKey, u64>, usize) {
    let mut buckets: HashMap<HourlyBucketKey, u64> = HashMap::new();
    let mut skipped = 0;

    for workspace in workspaces {
        let workspace_id = workspace
            .id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        for entry in workspace.lineups.values() {
            let record = RawVideoRecord::from_value(entry);
            let Some(created_at) = normalize_creation_time(&record, None) else {
                skipped += 1;
                continue;
            };
            if created_at < start || created_at >= end {
                continue;
            }
            let key = HourlyBucketKey {
                workspace_id: workspace_id.clone(),
                workspace_name: workspace.name.clone(),
                hour: truncate_to_hour(created_at),
            };
            *buckets.entry(key).or_insert(0) += 1;
        }
    }

    (buckets, skipped)
}

/// Per-workspace totals, ordered by each workspace's first active hour.
pub fn summarize(buckets: &HashMap<HourlyBucketKey, u64>) -> Vec<WorkspaceSummary> {
    let mut per_workspace: BTreeMap<&str, (NaiveDateTime, WorkspaceSummary)> = BTreeMap::new();

    for (key, count) in buckets {
        let (first_hour, summary) = per_workspace
            .entry(key.workspace_id.as_str())
            .or_insert_with(|| {
                (
                    key.hour,
                    WorkspaceSummary {
                        workspace_id: key.workspace_id.clone(),
                        workspace_name: key.workspace_name.clone(),
                        total_videos: 0,
                        active_periods: 0,
                    },
                )
            });
        *first_hour = (*first_hour).min(key.hour);
        summary.total_videos += count;
        summary.active_periods += 1;
    }

    let mut summaries: Vec<(NaiveDateTime, WorkspaceSummary)> =
        per_workspace.into_values().collect();
    summaries.sort_by(|(a_hour, a), (b_hour, b)| {
        a_hour
            .cmp(b_hour)
            .then_with(|| a.workspace_id.cmp(&b.workspace_id))
    });
    summaries.into_iter().map(|(_, summary)| summary).collect()
}

/// Compute a usage report from already-loaded workspaces.
pub fn compute_usage(workspaces: &[WorkspaceDocument], query: &UsageQuery) -> WorkspaceUsage {
    let (start, end) = query.window();
    let (buckets, skipped) = hourly_buckets(workspaces, start, end);
    if skipped > 0 {
        log::warn!(
            "Skipped {} lineup entries without a creation timestamp",
            skipped
        );
    }

    let workspace_summary = summarize(&buckets);

    let mut hourly = HourlyCounts::new();
    for (key, count) in &buckets {
        hourly.add(key.hour, *count);
    }

    let trend_data = aggregate(&hourly, query.granularity);
    let statistics = UsageStatistics::compute(&hourly, &trend_data, query.total_hours());

    WorkspaceUsage {
        start_date: query.start_date.format(DATE_FORMAT).to_string(),
        end_date: query.end_date.format(DATE_FORMAT).to_string(),
        granularity: query.granularity,
        total_workspaces: workspace_summary.len(),
        total_videos: hourly.total(),
        workspace_summary,
        trend_data,
        statistics,
    }
}

/// Usage summary over every workspace in the store.
pub async fn workspace_usage<R>(repo: &R, query: &UsageQuery) -> ServiceResult<WorkspaceUsage>
where
    R: FullRepository + ?Sized,
{
    let workspaces = repo.list_workspaces().await?;
    let usage = compute_usage(&workspaces, query);
    log::info!(
        "Computed {} workspace usage for {}..{}: {} videos across {} workspaces",
        query.granularity,
        usage.start_date,
        usage.end_date,
        usage.total_videos,
        usage.total_workspaces
    );
    Ok(usage)
}
