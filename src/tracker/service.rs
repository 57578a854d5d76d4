use std::sync::Arc;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::utils::clock::Clock;

use super::{
    entities::{CheckinOutcome, CheckinRecord, DashboardWindow, StatusSnapshot},
    normalize::{distinct_dates, normalize},
    store::CheckinStore,
    streak::{dashboard_window, status_snapshot, streak_summary},
};

pub const DEFAULT_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_WINDOW_DAYS: usize = 30;

/// Bridges the streak engine and the [CheckinStore]. Every read loads the collection fresh from
/// the store. [CheckinService::record_checkin] is the only operation that writes, and its whole
/// load-modify-save cycle runs under one lock.
pub struct CheckinService {
    store: Box<dyn CheckinStore>,
    clock: Arc<dyn Clock>,
    retention_days: u32,
    write_lock: Mutex<()>,
}

impl CheckinService {
    pub fn new(store: Box<dyn CheckinStore>, clock: Arc<dyn Clock>, retention_days: u32) -> Self {
        Self {
            store,
            clock,
            retention_days,
            write_lock: Mutex::new(()),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Canonical collection as currently stored.
    pub async fn load(&self) -> Result<Vec<CheckinRecord>> {
        let raw = self.store.load_raw().await?;
        Ok(normalize(&raw))
    }

    pub async fn status(&self) -> Result<StatusSnapshot> {
        let records = self.load().await?;
        Ok(status_snapshot(&records, self.today()))
    }

    pub async fn dashboard(&self, window_days: usize) -> Result<DashboardWindow> {
        let records = self.load().await?;
        Ok(dashboard_window(&records, window_days, self.today()))
    }

    /// Distinct checked dates, most recent first.
    pub async fn checkins(&self) -> Result<Vec<NaiveDate>> {
        let records = self.load().await?;
        Ok(distinct_dates(&records))
    }

    pub async fn is_checked_in(&self, date: NaiveDate) -> Result<bool> {
        let records = self.load().await?;
        Ok(records.iter().any(|v| v.date == date))
    }

    /// Checks in for the current local date.
    pub async fn record_checkin(&self) -> CheckinOutcome {
        let now = self.clock.time();
        self.record_checkin_at(now.date_naive(), now.timestamp_millis())
            .await
    }

    /// Records a check-in for `today` unless one exists already. Safe to call any number of times
    /// per day: only the first call writes, and its timestamp is the one that stays.
    #[instrument(skip(self))]
    pub async fn record_checkin_at(&self, today: NaiveDate, timestamp: i64) -> CheckinOutcome {
        let _guard = self.write_lock.lock().await;

        match self.append_checkin(today, timestamp).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Check-in for {today} failed {e:?}");
                CheckinOutcome::Failed(e)
            }
        }
    }

    async fn append_checkin(&self, today: NaiveDate, timestamp: i64) -> Result<CheckinOutcome> {
        let mut records = self.load().await?;

        if records.iter().any(|v| v.date == today) {
            info!("Already checked in for {today}");
            return Ok(CheckinOutcome::AlreadyCheckedIn(streak_summary(
                &records, today,
            )));
        }

        records.push(CheckinRecord::new(today, timestamp));
        records.sort_by(|a, b| b.date.cmp(&a.date));
        // The sort is stable, so the first stored record of a repeated date wins.
        records.dedup_by_key(|v| v.date);
        let records = prune(records, today, self.retention_days);

        self.store.save(&records).await?;

        let summary = streak_summary(&records, today);
        info!(
            "Checked in for {today}, current streak {} best streak {}",
            summary.current_streak, summary.best_streak
        );
        Ok(CheckinOutcome::Recorded(summary))
    }
}

/// Drops records older than `retention_days` before `today`. The cutoff date itself is kept. A
/// retention reaching past the earliest representable date keeps everything.
fn prune(records: Vec<CheckinRecord>, today: NaiveDate, retention_days: u32) -> Vec<CheckinRecord> {
    let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(retention_days))) else {
        return records;
    };
    records.into_iter().filter(|v| v.date >= cutoff).collect()
}
