//! Background synchronization
//!
//! [`Synchronizer`] is the single fetch-and-replace path for all three
//! collections: on success the store snapshot is swapped wholesale, on
//! failure an ERROR entry is recorded and the stale snapshot stays
//! available. [`SyncScheduler`] drives it on independent cadences and
//! hands back an abortable [`SyncHandle`]; after shutdown no fetch can
//! complete, so a request that was in flight at teardown can never write
//! into a store afterwards.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use costwatch_api::CostApi;

use crate::activity::{ActivityKind, ActivityLog};
use crate::store::Stores;

/// Polling cadences per collection.
///
/// Alerts are the most time-sensitive, data sources the least; the
/// defaults keep the 15/30/60 ratio of the backend's expectations.
#[derive(Debug, Clone, Copy)]
pub struct SyncIntervals {
    pub alerts: Duration,
    pub checks: Duration,
    pub sources: Duration,
}

impl Default for SyncIntervals {
    fn default() -> Self {
        Self {
            alerts: Duration::from_secs(15),
            checks: Duration::from_secs(30),
            sources: Duration::from_secs(60),
        }
    }
}

impl SyncIntervals {
    /// With the alerts cadence
    #[inline]
    #[must_use]
    pub fn with_alerts(mut self, interval: Duration) -> Self {
        self.alerts = interval;
        self
    }

    /// With the checks cadence
    #[inline]
    #[must_use]
    pub fn with_checks(mut self, interval: Duration) -> Self {
        self.checks = interval;
        self
    }

    /// With the data-sources cadence
    #[inline]
    #[must_use]
    pub fn with_sources(mut self, interval: Duration) -> Self {
        self.sources = interval;
        self
    }
}

/// Fetch-and-replace for the three entity stores.
#[derive(Clone)]
pub struct Synchronizer {
    api: Arc<dyn CostApi>,
    stores: Stores,
    log: ActivityLog,
}

impl Synchronizer {
    /// Create a synchronizer over the given api handle, stores and log.
    #[must_use]
    pub fn new(api: Arc<dyn CostApi>, stores: Stores, log: ActivityLog) -> Self {
        Self { api, stores, log }
    }

    /// Re-fetch the checks collection and swap the snapshot.
    pub async fn refresh_checks(&self) {
        match self.api.list_checks().await {
            Ok(checks) => {
                tracing::debug!(count = checks.len(), "refreshed checks");
                self.stores.checks.replace(checks).await;
            }
            Err(e) => self
                .log
                .record(format!("Error fetching checks: {e}"), ActivityKind::Error),
        }
    }

    /// Re-fetch the alerts collection and swap the snapshot.
    pub async fn refresh_alerts(&self) {
        match self.api.list_alerts().await {
            Ok(alerts) => {
                tracing::debug!(count = alerts.len(), "refreshed alerts");
                self.stores.alerts.replace(alerts).await;
            }
            Err(e) => self.log.record(
                format!("Error fetching system alerts: {e}"),
                ActivityKind::Error,
            ),
        }
    }

    /// Re-fetch the data-sources collection and swap the snapshot.
    pub async fn refresh_sources(&self) {
        match self.api.list_data_sources().await {
            Ok(sources) => {
                tracing::debug!(count = sources.len(), "refreshed data sources");
                self.stores.sources.replace(sources).await;
            }
            Err(e) => self.log.record(
                format!("Error fetching data sources: {e}"),
                ActivityKind::Error,
            ),
        }
    }

    /// Refresh all three collections concurrently.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.refresh_checks(),
            self.refresh_alerts(),
            self.refresh_sources()
        );
    }
}

/// Handle over the running poll loops.
///
/// Shutting down (or dropping) aborts all loops; an in-flight fetch is
/// dropped at its next await point and cannot re-arm further refreshes.
#[derive(Debug)]
pub struct SyncHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SyncHandle {
    /// Cancel all poll loops.
    pub fn shutdown(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Spawns the per-collection poll loops.
pub struct SyncScheduler;

impl SyncScheduler {
    /// Start polling. Each collection is fetched immediately, then on
    /// its own cadence.
    #[must_use]
    pub fn start(sync: Synchronizer, intervals: SyncIntervals) -> SyncHandle {
        tracing::info!(
            alerts_secs = intervals.alerts.as_secs_f64(),
            checks_secs = intervals.checks.as_secs_f64(),
            sources_secs = intervals.sources.as_secs_f64(),
            "starting sync scheduler"
        );

        let alerts = {
            let sync = sync.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(intervals.alerts);
                loop {
                    ticker.tick().await;
                    sync.refresh_alerts().await;
                }
            })
        };

        let checks = {
            let sync = sync.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(intervals.checks);
                loop {
                    ticker.tick().await;
                    sync.refresh_checks().await;
                }
            })
        };

        let sources = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(intervals.sources);
            loop {
                ticker.tick().await;
                sync.refresh_sources().await;
            }
        });

        SyncHandle {
            tasks: vec![alerts, checks, sources],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costwatch_api::CheckStatus;
    use costwatch_test_utils::{sample_alert, sample_check, MockApi, RecordedCall};

    fn synchronizer(api: Arc<MockApi>) -> (Synchronizer, Stores, ActivityLog) {
        let stores = Stores::new();
        let log = ActivityLog::new();
        let sync = Synchronizer::new(api, stores.clone(), log.clone());
        (sync, stores, log)
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot_on_success() {
        let api = MockApi::new();
        api.seed_checks(vec![sample_check("chk-1", CheckStatus::Active)]);
        let (sync, stores, log) = synchronizer(api);

        sync.refresh_checks().await;

        assert_eq!(stores.checks.len().await, 1);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_keeps_stale_snapshot_and_logs() {
        let api = MockApi::new();
        api.seed_alerts(vec![sample_alert("a-1", "old alert")]);
        let (sync, stores, log) = synchronizer(api.clone());

        sync.refresh_alerts().await;
        assert_eq!(stores.alerts.len().await, 1);

        api.seed_alerts(vec![]);
        api.set_failure(500, "backend on fire");
        sync.refresh_alerts().await;

        // Stale-but-available over empty.
        assert_eq!(stores.alerts.len().await, 1);
        let latest = log.latest().unwrap();
        assert_eq!(latest.kind, ActivityKind::Error);
        assert!(latest.message.contains("backend on fire"));
    }

    #[tokio::test]
    async fn scheduler_fetches_immediately_and_keeps_polling() {
        let api = MockApi::new();
        let (sync, _stores, _log) = synchronizer(api.clone());

        let intervals = SyncIntervals::default()
            .with_alerts(Duration::from_millis(20))
            .with_checks(Duration::from_millis(500))
            .with_sources(Duration::from_millis(500));
        let handle = SyncScheduler::start(sync, intervals);

        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.shutdown();

        assert!(api.call_count(&RecordedCall::ListAlerts) >= 2);
        assert_eq!(api.call_count(&RecordedCall::ListChecks), 1);
        assert_eq!(api.call_count(&RecordedCall::ListDataSources), 1);
    }

    #[tokio::test]
    async fn shutdown_stops_all_polling() {
        let api = MockApi::new();
        let (sync, _stores, _log) = synchronizer(api.clone());

        let intervals = SyncIntervals::default()
            .with_alerts(Duration::from_millis(10))
            .with_checks(Duration::from_millis(10))
            .with_sources(Duration::from_millis(10));
        let handle = SyncScheduler::start(sync, intervals);

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown();
        let calls_at_shutdown = api.calls().len();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.calls().len(), calls_at_shutdown);
    }

    #[tokio::test]
    async fn dropping_the_handle_also_stops_polling() {
        let api = MockApi::new();
        let (sync, _stores, _log) = synchronizer(api.clone());

        let intervals = SyncIntervals::default()
            .with_alerts(Duration::from_millis(10))
            .with_checks(Duration::from_millis(10))
            .with_sources(Duration::from_millis(10));
        let handle = SyncScheduler::start(sync, intervals);

        tokio::time::sleep(Duration::from_millis(40)).await;
        drop(handle);
        let calls_at_drop = api.calls().len();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.calls().len(), calls_at_drop);
    }
}
