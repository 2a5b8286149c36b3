//! Action dispatch
//!
//! Maps heterogeneous (entity, action) pairs onto backend calls and
//! reconciles local state afterwards. The pair table is a closed,
//! exhaustive match: adding an entity or action is a compile-time
//! checked extension. A single advisory busy flag spans all dispatches;
//! it drives UI affordances and is cleared on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use costwatch_api::{CheckStatus, CostApi};

use crate::activity::{ActivityKind, ActivityLog};
use crate::store::Stores;
use crate::sync::Synchronizer;

/// Entity collections a mutating action can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Check,
    DataSource,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Check => write!(f, "check"),
            EntityKind::DataSource => write!(f, "data source"),
        }
    }
}

/// Mutating actions the backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAction {
    Delete,
    Pause,
    Resume,
}

impl EntityAction {
    /// Imperative form for "attempting to ..." messages.
    #[inline]
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            EntityAction::Delete => "delete",
            EntityAction::Pause => "pause",
            EntityAction::Resume => "resume",
        }
    }

    /// Progressive form for error messages.
    #[inline]
    #[must_use]
    pub fn gerund(&self) -> &'static str {
        match self {
            EntityAction::Delete => "deleting",
            EntityAction::Pause => "pausing",
            EntityAction::Resume => "resuming",
        }
    }
}

/// A (kind, action) pair resolved to a concrete backend operation.
#[derive(Debug, Clone, Copy)]
enum Operation {
    DeleteCheck,
    PauseCheck,
    ResumeCheck,
    DeleteSource,
}

impl Operation {
    fn success_message(self) -> &'static str {
        match self {
            Operation::DeleteCheck => "Check deleted successfully.",
            Operation::PauseCheck => "Check paused successfully.",
            Operation::ResumeCheck => "Check resumed successfully.",
            Operation::DeleteSource => "Data source deleted successfully.",
        }
    }
}

/// Clears the busy flag on every exit path.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Mutate-then-refresh coordinator for delete / pause / resume.
///
/// Creation and update of checks is not here: that is the edit
/// session's re-parse path, the only one that produces a `Check`.
#[derive(Clone)]
pub struct ActionDispatcher {
    api: Arc<dyn CostApi>,
    sync: Synchronizer,
    stores: Stores,
    log: ActivityLog,
    busy: Arc<AtomicBool>,
}

impl ActionDispatcher {
    /// Create a dispatcher over the shared api handle, synchronizer,
    /// stores and log.
    #[must_use]
    pub fn new(
        api: Arc<dyn CostApi>,
        sync: Synchronizer,
        stores: Stores,
        log: ActivityLog,
    ) -> Self {
        Self {
            api,
            sync,
            stores,
            log,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a dispatch is in flight. Advisory only: it does not
    /// serialize network traffic, and the poll loops ignore it.
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Perform `action` on the entity with `id`, then refresh dependent
    /// state.
    ///
    /// On success the entity's own store is re-fetched, and the alert
    /// store unconditionally with it - any mutation may have produced
    /// new alerts. On failure an ERROR entry carries the server detail
    /// and the stores are left untouched. Outcomes land in the activity
    /// log; nothing propagates to the caller.
    pub async fn dispatch(&self, kind: EntityKind, action: EntityAction, id: &str) {
        let operation = match (kind, action) {
            (EntityKind::Check, EntityAction::Delete) => Operation::DeleteCheck,
            (EntityKind::Check, EntityAction::Pause) => Operation::PauseCheck,
            (EntityKind::Check, EntityAction::Resume) => Operation::ResumeCheck,
            (EntityKind::DataSource, EntityAction::Delete) => Operation::DeleteSource,
            (EntityKind::DataSource, EntityAction::Pause | EntityAction::Resume) => {
                self.log.record(
                    format!("Cannot {} a data source", action.verb()),
                    ActivityKind::Warn,
                );
                return;
            }
        };

        self.log.record(
            format!("Attempting to {} {kind} {id}...", action.verb()),
            ActivityKind::Info,
        );
        let _busy = BusyGuard::acquire(Arc::clone(&self.busy));

        let result = match operation {
            Operation::DeleteCheck => self.api.delete_check(id).await,
            Operation::PauseCheck => self.api.pause_check(id).await,
            Operation::ResumeCheck => self.api.resume_check(id).await,
            Operation::DeleteSource => self.api.delete_data_source(id).await,
        };

        match result {
            Ok(()) => {
                self.log
                    .record(operation.success_message(), ActivityKind::Success);
                match kind {
                    EntityKind::Check => self.sync.refresh_checks().await,
                    EntityKind::DataSource => self.sync.refresh_sources().await,
                }
                self.sync.refresh_alerts().await;
            }
            Err(e) => self.log.record(
                format!("Error {} {kind}: {e}", action.gerund()),
                ActivityKind::Error,
            ),
        }
    }

    /// Toggle a check between active and paused.
    ///
    /// The `error` status is reachable only server-side and is not
    /// user-togglable: attempting it is a logged no-op that issues zero
    /// requests, as is toggling an id the snapshot does not contain.
    pub async fn toggle_check(&self, id: &str) {
        let Some(check) = self.stores.checks.find(id).await else {
            self.log.record(
                format!("Cannot toggle unknown check {id}"),
                ActivityKind::Warn,
            );
            return;
        };

        match check.status {
            CheckStatus::Active => {
                self.dispatch(EntityKind::Check, EntityAction::Pause, id).await;
            }
            CheckStatus::Paused => {
                self.dispatch(EntityKind::Check, EntityAction::Resume, id).await;
            }
            CheckStatus::Error => self.log.record(
                format!(
                    "Cannot toggle status for check '{}' with status: {}",
                    check.query_snippet(20),
                    check.status.as_str()
                ),
                ActivityKind::Warn,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costwatch_test_utils::{sample_check, MockApi, RecordedCall};
    use pretty_assertions::assert_eq;

    fn dispatcher(api: Arc<MockApi>) -> (ActionDispatcher, Synchronizer, Stores, ActivityLog) {
        let stores = Stores::new();
        let log = ActivityLog::new();
        let sync = Synchronizer::new(api.clone(), stores.clone(), log.clone());
        let dispatcher = ActionDispatcher::new(api, sync.clone(), stores.clone(), log.clone());
        (dispatcher, sync, stores, log)
    }

    #[tokio::test]
    async fn toggle_round_trip_issues_one_request_per_step() {
        let api = MockApi::new();
        api.seed_checks(vec![sample_check("chk-1", CheckStatus::Active)]);
        let (dispatcher, sync, stores, _log) = dispatcher(api.clone());
        sync.refresh_checks().await;
        api.reset_calls();

        dispatcher.toggle_check("chk-1").await;
        assert_eq!(
            api.call_count(&RecordedCall::PauseCheck("chk-1".to_string())),
            1
        );
        assert_eq!(
            stores.checks.find("chk-1").await.unwrap().status,
            CheckStatus::Paused
        );

        dispatcher.toggle_check("chk-1").await;
        assert_eq!(
            api.call_count(&RecordedCall::ResumeCheck("chk-1".to_string())),
            1
        );
        assert_eq!(
            stores.checks.find("chk-1").await.unwrap().status,
            CheckStatus::Active
        );
    }

    #[tokio::test]
    async fn mutation_refreshes_alerts_unconditionally() {
        let api = MockApi::new();
        api.seed_checks(vec![sample_check("chk-1", CheckStatus::Active)]);
        let (dispatcher, _sync, _stores, _log) = dispatcher(api.clone());

        dispatcher
            .dispatch(EntityKind::Check, EntityAction::Delete, "chk-1")
            .await;

        assert_eq!(
            api.call_count(&RecordedCall::DeleteCheck("chk-1".to_string())),
            1
        );
        assert_eq!(api.call_count(&RecordedCall::ListChecks), 1);
        assert_eq!(api.call_count(&RecordedCall::ListAlerts), 1);
    }

    #[tokio::test]
    async fn error_status_toggle_is_a_logged_noop() {
        let api = MockApi::new();
        api.seed_checks(vec![sample_check("chk-err", CheckStatus::Error)]);
        let (dispatcher, sync, _stores, log) = dispatcher(api.clone());
        sync.refresh_checks().await;
        api.reset_calls();

        dispatcher.toggle_check("chk-err").await;

        assert!(api.calls().is_empty());
        let latest = log.latest().unwrap();
        assert_eq!(latest.kind, ActivityKind::Warn);
        assert!(latest.message.contains("status: error"));
    }

    #[tokio::test]
    async fn unsupported_pair_is_rejected_without_a_request() {
        let api = MockApi::new();
        let (dispatcher, _sync, _stores, log) = dispatcher(api.clone());

        dispatcher
            .dispatch(EntityKind::DataSource, EntityAction::Pause, "ds-1")
            .await;

        assert!(api.calls().is_empty());
        assert_eq!(log.latest().unwrap().kind, ActivityKind::Warn);
    }

    #[tokio::test]
    async fn failure_logs_server_detail_and_leaves_store_untouched() {
        let api = MockApi::new();
        api.seed_checks(vec![sample_check("chk-1", CheckStatus::Active)]);
        let (dispatcher, sync, stores, log) = dispatcher(api.clone());
        sync.refresh_checks().await;

        api.set_failure(404, "Check not found");
        dispatcher
            .dispatch(EntityKind::Check, EntityAction::Delete, "chk-1")
            .await;

        let latest = log.latest().unwrap();
        assert_eq!(latest.kind, ActivityKind::Error);
        assert!(latest.message.contains("Check not found"));
        assert_eq!(stores.checks.len().await, 1);
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn busy_flag_clears_after_success_and_failure() {
        let api = MockApi::new();
        api.seed_checks(vec![sample_check("chk-1", CheckStatus::Active)]);
        let (dispatcher, _sync, _stores, _log) = dispatcher(api.clone());

        dispatcher
            .dispatch(EntityKind::Check, EntityAction::Pause, "chk-1")
            .await;
        assert!(!dispatcher.is_busy());

        api.set_failure(500, "boom");
        dispatcher
            .dispatch(EntityKind::Check, EntityAction::Resume, "chk-1")
            .await;
        assert!(!dispatcher.is_busy());
    }
}
