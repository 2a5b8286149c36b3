//! Testing utilities for the CostWatch workspace
//!
//! Shared fixtures and an in-memory [`CostApi`] implementation that
//! records every call, so tests can assert on exactly which requests a
//! component issued.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use costwatch_api::{
    Alert, ApiError, Check, CheckStatus, CostApi, DataSource, NewDataSource, ParseQueryRequest,
};
use costwatch_schema::{ProviderKind, RawSourceInput};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListChecks,
    ListAlerts,
    ListDataSources,
    ParseQuery {
        query: String,
        data_source_id: Option<String>,
    },
    DeleteCheck(String),
    PauseCheck(String),
    ResumeCheck(String),
    CreateDataSource {
        name: String,
        kind: ProviderKind,
    },
    DeleteDataSource(String),
}

#[derive(Debug, Default)]
struct MockState {
    checks: Vec<Check>,
    alerts: Vec<Alert>,
    sources: Vec<DataSource>,
    calls: Vec<RecordedCall>,
    failure: Option<(u16, String)>,
    next_id: u64,
}

/// In-memory backend double.
///
/// Successful mutations update the internal collections, so a
/// subsequent list call observes the new state the way a real refresh
/// would. `set_failure` makes every following call fail with the given
/// server response until cleared.
#[derive(Debug, Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_checks(&self, checks: Vec<Check>) {
        self.state.lock().checks = checks;
    }

    pub fn seed_alerts(&self, alerts: Vec<Alert>) {
        self.state.lock().alerts = alerts;
    }

    pub fn seed_sources(&self, sources: Vec<DataSource>) {
        self.state.lock().sources = sources;
    }

    /// Make every subsequent call fail with this server response.
    pub fn set_failure(&self, status: u16, detail: &str) {
        self.state.lock().failure = Some((status, detail.to_string()));
    }

    pub fn clear_failure(&self) {
        self.state.lock().failure = None;
    }

    /// Everything called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, call: &RecordedCall) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn record(&self, call: RecordedCall) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match &state.failure {
            Some((status, detail)) => Err(ApiError::Server {
                status: *status,
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }
}

#[async_trait]
impl CostApi for MockApi {
    async fn list_checks(&self) -> Result<Vec<Check>, ApiError> {
        self.record(RecordedCall::ListChecks)?;
        Ok(self.state.lock().checks.clone())
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.record(RecordedCall::ListAlerts)?;
        Ok(self.state.lock().alerts.clone())
    }

    async fn list_data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        self.record(RecordedCall::ListDataSources)?;
        Ok(self.state.lock().sources.clone())
    }

    async fn parse_query(&self, request: ParseQueryRequest) -> Result<Check, ApiError> {
        self.record(RecordedCall::ParseQuery {
            query: request.query.clone(),
            data_source_id: request.data_source_id.clone(),
        })?;

        let check = Check {
            id: self.fresh_id("chk"),
            query: request.query,
            schedule: "0 2 * * *".to_string(),
            condition: "spend above 7-day average".to_string(),
            suggestion: "review usage".to_string(),
            data_source_id: request.data_source_id,
            status: CheckStatus::Active,
            last_run_status: None,
            last_run_at: None,
        };
        self.state.lock().checks.push(check.clone());
        Ok(check)
    }

    async fn delete_check(&self, id: &str) -> Result<(), ApiError> {
        self.record(RecordedCall::DeleteCheck(id.to_string()))?;
        self.state.lock().checks.retain(|c| c.id != id);
        Ok(())
    }

    async fn pause_check(&self, id: &str) -> Result<(), ApiError> {
        self.record(RecordedCall::PauseCheck(id.to_string()))?;
        let mut state = self.state.lock();
        if let Some(check) = state.checks.iter_mut().find(|c| c.id == id) {
            check.status = CheckStatus::Paused;
        }
        Ok(())
    }

    async fn resume_check(&self, id: &str) -> Result<(), ApiError> {
        self.record(RecordedCall::ResumeCheck(id.to_string()))?;
        let mut state = self.state.lock();
        if let Some(check) = state.checks.iter_mut().find(|c| c.id == id) {
            check.status = CheckStatus::Active;
        }
        Ok(())
    }

    async fn create_data_source(&self, request: NewDataSource) -> Result<DataSource, ApiError> {
        self.record(RecordedCall::CreateDataSource {
            name: request.name.clone(),
            kind: request.kind,
        })?;

        let source = DataSource {
            id: self.fresh_id("ds"),
            name: request.name,
            kind: request.kind,
            config: request.config,
        };
        self.state.lock().sources.push(source.clone());
        Ok(source)
    }

    async fn delete_data_source(&self, id: &str) -> Result<(), ApiError> {
        self.record(RecordedCall::DeleteDataSource(id.to_string()))?;
        self.state.lock().sources.retain(|s| s.id != id);
        Ok(())
    }
}

/// A check fixture in the given scheduling state.
#[must_use]
pub fn sample_check(id: &str, status: CheckStatus) -> Check {
    Check {
        id: id.to_string(),
        query: format!("watch spend for {id}"),
        schedule: "0 2 * * *".to_string(),
        condition: "spend above 7-day average".to_string(),
        suggestion: "review usage".to_string(),
        data_source_id: Some("ds-1".to_string()),
        status,
        last_run_status: None,
        last_run_at: None,
    }
}

/// An alert fixture with the given message.
#[must_use]
pub fn sample_alert(id: &str, message: &str) -> Alert {
    Alert {
        id: id.to_string(),
        check_id: None,
        message: message.to_string(),
        alert_time: "2024-05-01 02:00:05".to_string(),
    }
}

/// A data-source fixture.
#[must_use]
pub fn sample_source(id: &str, name: &str, kind: ProviderKind) -> DataSource {
    DataSource {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        config: serde_json::json!({}),
    }
}

/// Complete, valid AWS form input.
#[must_use]
pub fn aws_raw_input() -> RawSourceInput {
    RawSourceInput::new()
        .set("access_key_id", "AKIA1234567890AB")
        .set("secret_access_key", "secret")
        .set("account_id", "123456789012")
}
