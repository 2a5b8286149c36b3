//! Console coordinator
//!
//! Wires the api handle, stores, activity log, synchronizer, dispatcher
//! and edit session together behind one owner, and carries the
//! workspace's configuration surface.

use std::sync::Arc;
use std::time::Duration;

use costwatch_api::{ApiError, CostApi, DataSource, HttpApi, NewDataSource};
use costwatch_schema::{registry, run_probe, ProbeConfig, ProbeFailure, ProviderKind, RawSourceInput};

use crate::activity::{ActivityKind, ActivityLog};
use crate::dispatch::{ActionDispatcher, EntityAction, EntityKind};
use crate::error::CreateSourceError;
use crate::session::EditSession;
use crate::store::Stores;
use crate::sync::{SyncHandle, SyncIntervals, SyncScheduler, Synchronizer};

/// Console configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend base URL (no trailing `/api`)
    pub base_url: String,
    /// Polling cadences
    pub intervals: SyncIntervals,
    /// Optional per-request timeout; none by default
    pub request_timeout: Option<Duration>,
    /// Connection-probe latency window
    pub probe: ProbeConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            intervals: SyncIntervals::default(),
            request_timeout: None,
            probe: ProbeConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With the backend base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With polling cadences
    #[inline]
    #[must_use]
    pub fn with_intervals(mut self, intervals: SyncIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// With a per-request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// With a probe latency window
    #[inline]
    #[must_use]
    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }
}

/// The user-facing coordinator.
///
/// Owns the shared state and exposes every operation the UI needs;
/// outcomes land in the activity log, and validation failures are
/// returned inline before any request is issued.
pub struct Console {
    config: ConsoleConfig,
    api: Arc<dyn CostApi>,
    stores: Stores,
    log: ActivityLog,
    sync: Synchronizer,
    dispatcher: ActionDispatcher,
    session: EditSession,
    sync_handle: Option<SyncHandle>,
}

impl Console {
    /// Create a console talking to the configured backend over HTTP.
    ///
    /// # Errors
    /// Propagates HTTP client construction failure.
    pub fn new(config: ConsoleConfig) -> Result<Self, ApiError> {
        let mut api = HttpApi::new(config.base_url.clone());
        if let Some(timeout) = config.request_timeout {
            api = api.with_timeout(timeout)?;
        }
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create a console over an arbitrary api implementation.
    #[must_use]
    pub fn with_api(config: ConsoleConfig, api: Arc<dyn CostApi>) -> Self {
        let stores = Stores::new();
        let log = ActivityLog::new();
        let sync = Synchronizer::new(Arc::clone(&api), stores.clone(), log.clone());
        let dispatcher = ActionDispatcher::new(
            Arc::clone(&api),
            sync.clone(),
            stores.clone(),
            log.clone(),
        );
        let session = EditSession::new(Arc::clone(&api), sync.clone(), stores.clone(), log.clone());

        Self {
            config,
            api,
            stores,
            log,
            sync,
            dispatcher,
            session,
            sync_handle: None,
        }
    }

    /// The activity log handle.
    #[inline]
    #[must_use]
    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    /// The entity snapshots.
    #[inline]
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// The edit session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// The action dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Configuration in effect.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Whether a dispatch is in flight (advisory).
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_busy()
    }

    /// Whether the poll loops are running.
    #[inline]
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.sync_handle.is_some()
    }

    /// Start the poll loops (idempotent).
    pub fn start_sync(&mut self) {
        if self.sync_handle.is_none() {
            self.sync_handle = Some(SyncScheduler::start(
                self.sync.clone(),
                self.config.intervals,
            ));
        }
    }

    /// Cancel the poll loops. No fetch runs after this returns; one
    /// that was in flight is dropped and cannot write into a store.
    pub fn stop_sync(&mut self) {
        if let Some(handle) = self.sync_handle.take() {
            handle.shutdown();
        }
    }

    /// Refresh all three snapshots once, immediately.
    pub async fn refresh_all(&self) {
        self.sync.refresh_all().await;
    }

    /// Validate, normalize and create a data source.
    ///
    /// Structural validation gates the request: a blank name or any
    /// unsatisfied field rule returns inline with zero network calls.
    /// Backend rejection is recorded in the activity log and also
    /// returned for inline display.
    ///
    /// # Errors
    /// [`CreateSourceError`] for validation failures and backend
    /// rejections.
    pub async fn create_data_source(
        &self,
        name: &str,
        kind: ProviderKind,
        input: &RawSourceInput,
    ) -> Result<DataSource, CreateSourceError> {
        if name.trim().is_empty() {
            return Err(CreateSourceError::MissingName);
        }
        registry::validate(kind, input)?;

        let request = NewDataSource {
            name: name.trim().to_string(),
            kind,
            config: registry::build(kind, input),
        };

        match self.api.create_data_source(request).await {
            Ok(source) => {
                self.log.record(
                    "Data source registered successfully!",
                    ActivityKind::Success,
                );
                self.sync.refresh_sources().await;
                Ok(source)
            }
            Err(e) => {
                self.log.record(
                    format!("Error creating data source: {e}"),
                    ActivityKind::Error,
                );
                Err(e.into())
            }
        }
    }

    /// Run the simulated connection test for raw form input.
    ///
    /// Informational only: the outcome never blocks submission and
    /// nothing is mutated.
    ///
    /// # Errors
    /// [`ProbeFailure`] describing the unsatisfied requirement.
    pub async fn probe_connection(
        &self,
        kind: ProviderKind,
        input: &RawSourceInput,
    ) -> Result<String, ProbeFailure> {
        run_probe(kind, input, self.config.probe).await
    }

    /// Delete a check.
    pub async fn delete_check(&self, id: &str) {
        self.dispatcher
            .dispatch(EntityKind::Check, EntityAction::Delete, id)
            .await;
    }

    /// Pause a check.
    pub async fn pause_check(&self, id: &str) {
        self.dispatcher
            .dispatch(EntityKind::Check, EntityAction::Pause, id)
            .await;
    }

    /// Resume a check.
    pub async fn resume_check(&self, id: &str) {
        self.dispatcher
            .dispatch(EntityKind::Check, EntityAction::Resume, id)
            .await;
    }

    /// Toggle a check between active and paused.
    pub async fn toggle_check(&self, id: &str) {
        self.dispatcher.toggle_check(id).await;
    }

    /// Delete a data source.
    pub async fn delete_data_source(&self, id: &str) {
        self.dispatcher
            .dispatch(EntityKind::DataSource, EntityAction::Delete, id)
            .await;
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costwatch_test_utils::{aws_raw_input, MockApi, RecordedCall};
    use pretty_assertions::assert_eq;

    fn console(api: Arc<MockApi>) -> Console {
        Console::with_api(ConsoleConfig::new(), api)
    }

    #[tokio::test]
    async fn blank_name_blocks_creation_entirely() {
        let api = MockApi::new();
        let console = console(api.clone());

        let err = console
            .create_data_source("   ", ProviderKind::Csv, &RawSourceInput::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CreateSourceError::MissingName));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_config_blocks_creation_entirely() {
        let api = MockApi::new();
        let console = console(api.clone());

        let input = RawSourceInput::new().set("access_key_id", "AKIA1234567890AB");
        let err = console
            .create_data_source("Prod AWS", ProviderKind::AwsCostExplorer, &input)
            .await
            .unwrap_err();

        match err {
            CreateSourceError::Invalid(schema) => {
                assert_eq!(
                    schema.missing_fields(),
                    ["AWS Secret Access Key", "AWS Account ID"]
                );
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn creation_success_refreshes_sources() {
        let api = MockApi::new();
        let console = console(api.clone());

        let source = console
            .create_data_source("Prod AWS", ProviderKind::AwsCostExplorer, &aws_raw_input())
            .await
            .unwrap();

        assert_eq!(
            api.call_count(&RecordedCall::CreateDataSource {
                name: "Prod AWS".to_string(),
                kind: ProviderKind::AwsCostExplorer,
            }),
            1
        );
        assert!(console
            .stores()
            .sources
            .snapshot()
            .await
            .iter()
            .any(|s| s.id == source.id));
        assert_eq!(
            console.activity().entries()[0].message,
            "Data source registered successfully!"
        );
    }

    #[tokio::test]
    async fn creation_failure_is_logged_and_returned() {
        let api = MockApi::new();
        let console = console(api.clone());

        api.set_failure(400, "Name might already exist for this tenant.");
        let err = console
            .create_data_source("Prod AWS", ProviderKind::AwsCostExplorer, &aws_raw_input())
            .await
            .unwrap_err();

        assert!(matches!(err, CreateSourceError::Api(_)));
        let latest = console.activity().latest().unwrap();
        assert_eq!(latest.kind, ActivityKind::Error);
        assert!(latest.message.contains("already exist"));
        assert!(console.stores().sources.is_empty().await);
    }

    #[tokio::test]
    async fn probe_passthrough_is_read_only() {
        let api = MockApi::new();
        let console = Console::with_api(
            ConsoleConfig::new().with_probe(ProbeConfig::immediate()),
            api.clone(),
        );

        let detail = console
            .probe_connection(ProviderKind::AwsCostExplorer, &aws_raw_input())
            .await
            .unwrap();
        assert!(detail.contains("AWS connection successful"));
        assert!(api.calls().is_empty());
        assert!(console.stores().sources.is_empty().await);
    }

    #[tokio::test]
    async fn start_and_stop_sync_toggle_the_handle() {
        let api = MockApi::new();
        let mut console = console(api);

        assert!(!console.is_syncing());
        console.start_sync();
        assert!(console.is_syncing());
        console.start_sync(); // idempotent
        console.stop_sync();
        assert!(!console.is_syncing());
    }
}
