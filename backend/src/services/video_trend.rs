//! Per-user daily video creation trend.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::events::{extract_user_events, VideoEvent};
use super::{ServiceError, ServiceResult};
use crate::db::FullRepository;

/// Videos created on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub video_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTrend {
    pub user_email: String,
    pub video_creation_trend: Vec<DailyCount>,
}

/// Check a requested day count against the configured maximum.
pub fn validate_days(days: i64, max_days: u32) -> ServiceResult<u32> {
    if days < 0 {
        return Err(ServiceError::invalid("days must not be negative"));
    }
    u32::try_from(days)
        .ok()
        .filter(|d| *d <= max_days)
        .ok_or_else(|| ServiceError::invalid(format!("days must be at most {}", max_days)))
}

/// Count events per day inside `[now - days, now]` and emit exactly `days`
/// points starting at the window's first day, zero-count days included.
pub fn daily_trend(events: &[VideoEvent], days: u32, now: NaiveDateTime) -> Vec<DailyCount> {
    let start = now - Duration::days(i64::from(days));

    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for event in events {
        if start <= event.created_at && event.created_at <= now {
            *per_day.entry(event.created_at.date()).or_insert(0) += 1;
        }
    }

    (0..i64::from(days))
        .map(|offset| {
            let day = (start + Duration::days(offset)).date();
            DailyCount {
                date: day.format("%Y-%m-%d").to_string(),
                video_count: per_day.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Creation trend for one user over the `days` days ending at `now`.
pub async fn video_trend<R>(
    repo: &R,
    email: &str,
    days: u32,
    now: NaiveDateTime,
) -> ServiceResult<VideoTrend>
where
    R: FullRepository + ?Sized,
{
    let events = extract_user_events(repo, email).await?;
    let trend = daily_trend(&events, days, now);
    log::info!(
        "Computed {}-day video trend for {} from {} events",
        days,
        email,
        events.len()
    );

    Ok(VideoTrend {
        user_email: email.to_string(),
        video_creation_trend: trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn event(s: &str) -> VideoEvent {
        VideoEvent {
            video_id: s.into(),
            workspace_id: "ws".into(),
            created_at: at(s),
        }
    }

    #[test]
    fn test_exactly_n_points_without_events() {
        let trend = daily_trend(&[], 7, at("2024-03-10 12:00:00"));
        assert_eq!(trend.len(), 7);
        assert!(trend.iter().all(|p| p.video_count == 0));
        assert_eq!(trend[0].date, "2024-03-03");
        assert_eq!(trend[6].date, "2024-03-09");
    }

    #[test]
    fn test_counts_inside_window_only() {
        let events = vec![
            event("2024-03-03 11:59:59"),
            event("2024-03-03 12:00:00"),
            event("2024-03-05 01:00:00"),
            event("2024-03-05 23:00:00"),
            event("2024-03-10 13:00:00"),
        ];
        let trend = daily_trend(&events, 7, at("2024-03-10 12:00:00"));

        assert_eq!(trend[0].video_count, 1);
        assert_eq!(trend[2].video_count, 2);
        assert_eq!(trend.iter().map(|p| p.video_count).sum::<u64>(), 3);
    }

    #[test]
    fn test_zero_days() {
        assert!(daily_trend(&[event("2024-03-10 12:00:00")], 0, at("2024-03-10 12:00:00")).is_empty());
    }

    #[test]
    fn test_validate_days() {
        assert_eq!(validate_days(30, 3650).unwrap(), 30);
        assert_eq!(validate_days(0, 3650).unwrap(), 0);
        assert!(validate_days(-1, 3650).is_err());
        assert!(validate_days(3651, 3650).is_err());
        assert!(validate_days(i64::MAX, 3650).is_err());
    }
}
