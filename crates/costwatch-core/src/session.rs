//! Check edit session
//!
//! Single-slot state machine for the create / edit / re-parse workflow.
//! At most one draft exists at a time; opening another edit silently
//! discards the previous draft (last-writer-wins). Submission goes to
//! the external parse endpoint, whose response is authoritative - this
//! is the only path that creates or updates a check.

use parking_lot::Mutex;
use std::sync::Arc;

use costwatch_api::{Check, CostApi, DataSource, ParseQueryRequest};

use crate::activity::{ActivityKind, ActivityLog};
use crate::error::SessionError;
use crate::store::Stores;
use crate::sync::Synchronizer;

/// The draft being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckDraft {
    /// Id of the check being re-parsed; `None` when creating
    pub check_id: Option<String>,
    /// Natural-language query text
    pub query: String,
    /// Selected data source
    pub data_source_id: Option<String>,
}

/// Workflow state. The draft travels with the state, so an in-flight
/// submission can restore it on failure and no flag combination can
/// disagree about whether a draft exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No check is being edited
    #[default]
    Idle,
    /// A draft is open for editing
    Editing(CheckDraft),
    /// The draft has been sent to the parse endpoint
    Submitting(CheckDraft),
}

impl SessionState {
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self, SessionState::Editing(_))
    }

    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, SessionState::Submitting(_))
    }

    /// The current draft, in either non-idle state.
    #[must_use]
    pub fn draft(&self) -> Option<&CheckDraft> {
        match self {
            SessionState::Idle => None,
            SessionState::Editing(draft) | SessionState::Submitting(draft) => Some(draft),
        }
    }
}

/// Preferred data source when entering create mode: a name containing
/// "default csv" (case-insensitively), else the first entry, else none.
#[must_use]
pub fn default_source_id(sources: &[DataSource]) -> Option<String> {
    sources
        .iter()
        .find(|s| s.name.to_lowercase().contains("default csv"))
        .or_else(|| sources.first())
        .map(|s| s.id.clone())
}

/// The create/edit/re-parse workflow.
#[derive(Clone)]
pub struct EditSession {
    api: Arc<dyn CostApi>,
    sync: Synchronizer,
    stores: Stores,
    log: ActivityLog,
    state: Arc<Mutex<SessionState>>,
}

impl EditSession {
    /// Create an idle session over the shared api handle, synchronizer,
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
            state: Arc::new(Mutex::new(SessionState::Idle)),
        }
    }

    /// Snapshot of the workflow state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// The current draft, if a session is open.
    #[must_use]
    pub fn draft(&self) -> Option<CheckDraft> {
        self.state.lock().draft().cloned()
    }

    /// Open a fresh draft for creating a check, preselecting a data
    /// source from the current snapshot. Any unsaved draft is
    /// discarded.
    ///
    /// # Errors
    /// `SessionError::SubmitInFlight` while a submission is running.
    pub async fn begin_create(&self) -> Result<(), SessionError> {
        let sources = self.stores.sources.snapshot().await;
        let preselected = default_source_id(&sources);

        let mut state = self.state.lock();
        if state.is_submitting() {
            return Err(SessionError::SubmitInFlight);
        }
        *state = SessionState::Editing(CheckDraft {
            check_id: None,
            query: String::new(),
            data_source_id: preselected,
        });
        Ok(())
    }

    /// Load an existing check into a draft for re-parsing. Any unsaved
    /// draft is discarded silently - at most one edit session exists.
    ///
    /// # Errors
    /// `SessionError::SubmitInFlight` while a submission is running.
    pub fn begin_edit(&self, check: &Check) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock();
            if state.is_submitting() {
                return Err(SessionError::SubmitInFlight);
            }
            *state = SessionState::Editing(CheckDraft {
                check_id: Some(check.id.clone()),
                query: check.query.clone(),
                data_source_id: check.data_source_id.clone(),
            });
        }
        self.log.record(
            format!(
                "Editing check: \"{}\". Modify and submit to re-parse.",
                check.query_snippet(30)
            ),
            ActivityKind::Info,
        );
        Ok(())
    }

    /// Replace the draft query text.
    ///
    /// # Errors
    /// `SessionError::NoDraft` when idle, `SubmitInFlight` mid-submit.
    pub fn set_query(&self, query: impl Into<String>) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        match &mut *state {
            SessionState::Idle => Err(SessionError::NoDraft),
            SessionState::Submitting(_) => Err(SessionError::SubmitInFlight),
            SessionState::Editing(draft) => {
                draft.query = query.into();
                Ok(())
            }
        }
    }

    /// Replace the draft's data-source selection.
    ///
    /// # Errors
    /// `SessionError::NoDraft` when idle, `SubmitInFlight` mid-submit.
    pub fn set_data_source(&self, id: Option<String>) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        match &mut *state {
            SessionState::Idle => Err(SessionError::NoDraft),
            SessionState::Submitting(_) => Err(SessionError::SubmitInFlight),
            SessionState::Editing(draft) => {
                draft.data_source_id = id;
                Ok(())
            }
        }
    }

    /// Discard the draft and return to idle. Idempotent when idle.
    ///
    /// # Errors
    /// `SessionError::SubmitInFlight` while a submission is running.
    pub fn cancel(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock();
            match &*state {
                SessionState::Idle => return Ok(()),
                SessionState::Submitting(_) => return Err(SessionError::SubmitInFlight),
                SessionState::Editing(_) => *state = SessionState::Idle,
            }
        }
        self.log.record("Editing cancelled.", ActivityKind::Info);
        Ok(())
    }

    /// Send the draft to the parse endpoint.
    ///
    /// Client-side validation runs first and blocks the request
    /// entirely: an empty query, or no data source selected while
    /// sources exist, never reaches the network. On acceptance the
    /// response check is authoritative - the checks and alerts
    /// snapshots are refreshed and the session returns to idle. On
    /// rejection the failure is recorded and the draft is preserved for
    /// correction, so `Ok(None)` means "backend said no, still
    /// editing".
    ///
    /// # Errors
    /// Validation and state errors; backend failures do not propagate.
    pub async fn submit(&self) -> Result<Option<Check>, SessionError> {
        let have_sources = !self.stores.sources.is_empty().await;

        let draft = {
            let mut state = self.state.lock();
            let draft = match &*state {
                SessionState::Idle => return Err(SessionError::NoDraft),
                SessionState::Submitting(_) => return Err(SessionError::SubmitInFlight),
                SessionState::Editing(draft) => draft.clone(),
            };

            if draft.query.trim().is_empty() {
                return Err(SessionError::EmptyQuery);
            }
            if have_sources && draft.data_source_id.is_none() {
                return Err(SessionError::NoDataSourceSelected);
            }

            *state = SessionState::Submitting(draft.clone());
            draft
        };

        self.log.record(
            format!(
                "Processing query for data source {}...",
                draft.data_source_id.as_deref().unwrap_or("default")
            ),
            ActivityKind::Info,
        );

        let request = ParseQueryRequest {
            query: draft.query.trim().to_string(),
            data_source_id: draft.data_source_id.clone(),
        };

        match self.api.parse_query(request).await {
            Ok(check) => {
                {
                    let mut state = self.state.lock();
                    if state.is_submitting() {
                        *state = SessionState::Idle;
                    }
                }
                let verb = if draft.check_id.is_some() {
                    "updated"
                } else {
                    "created"
                };
                self.log.record(
                    format!("Check '{}' {verb}.", check.query_snippet(30)),
                    ActivityKind::Success,
                );
                tokio::join!(self.sync.refresh_checks(), self.sync.refresh_alerts());
                Ok(Some(check))
            }
            Err(e) => {
                self.log.record(
                    format!("Error processing query: {e}"),
                    ActivityKind::Error,
                );
                let mut state = self.state.lock();
                if state.is_submitting() {
                    *state = SessionState::Editing(draft);
                }
                Ok(None)
            }
        }
    }
}
