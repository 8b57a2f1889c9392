use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::time::sleep;

use crate::core::ai::ReportGenerator;
use crate::core::forecast::ForecastSource;
use crate::core::mediaplan::{MediaplanService, MediaplanStore, RefreshSummary};
use crate::core::schedule::WeeklySchedule;
use crate::core::slides::DeckService;

/// Next slot and how long to sleep until it.
pub fn next_wait(schedule: &WeeklySchedule, now: DateTime<Utc>) -> (DateTime<Utc>, StdDuration) {
    let next = schedule.next_run_after(now);
    let wait = (next - now).to_std().unwrap_or(StdDuration::ZERO);
    (next, wait)
}

/// Refreshes every recorded deck on the weekly schedule until the process
/// is stopped. A failed pass is logged and the loop carries on.
pub async fn run_weekly_refresh<D, F, R, S>(
    service: Arc<MediaplanService<D, F, R, S>>,
    schedule: WeeklySchedule,
    run_now: bool,
) where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    tracing::info!(%schedule, "Weekly deck refresh scheduled");

    if run_now {
        refresh_pass(&service).await;
    }

    loop {
        let (next, wait) = next_wait(&schedule, Utc::now());
        tracing::info!(next_run = %next, wait_secs = wait.as_secs(), "Waiting for next refresh");
        sleep(wait).await;

        refresh_pass(&service).await;

        // The monotonic timer can fire a moment before the wall clock reaches the slot.
        sleep(StdDuration::from_secs(1)).await;
    }
}

async fn refresh_pass<D, F, R, S>(service: &MediaplanService<D, F, R, S>)
where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    match service.refresh_all().await {
        Ok(summary) => log_summary(&summary),
        Err(e) => tracing::error!(error = %e, "Weekly refresh failed"),
    }
}

fn log_summary(summary: &RefreshSummary) {
    tracing::info!(
        total = summary.total(),
        refreshed = summary.refreshed.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "Weekly refresh finished"
    );
    for (cohort, error) in &summary.failed {
        tracing::error!(cohort = %cohort, error = %error, "Deck was not refreshed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_waits_until_next_slot() {
        let schedule = WeeklySchedule::parse("saturday", "12:30", "UTC").unwrap();
        // 2026-10-19 is a Monday.
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        let (next, wait) = next_wait(&schedule, now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 24, 12, 30, 0).unwrap());
        assert_eq!(wait, StdDuration::from_secs(5 * 86_400 + 30 * 60));
    }

    #[test]
    fn test_wait_is_never_negative() {
        let schedule = WeeklySchedule::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 7, 40, 0).unwrap();

        let (next, wait) = next_wait(&schedule, now);
        assert!(next > now);
        assert!(wait > StdDuration::ZERO);
    }
}
