//! Error types for CostWatch Core
//!
//! Validation failures are raised before any network call and surfaced
//! inline to the caller; they are never recorded as network failures in
//! the activity log.

use costwatch_api::ApiError;
use costwatch_schema::SchemaError;

/// Failure of an edit-session operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The draft query is empty
    #[error("Please enter a query.")]
    EmptyQuery,

    /// Data sources exist but none is selected
    #[error("Please select a data source.")]
    NoDataSourceSelected,

    /// No draft is open
    #[error("no check is being edited")]
    NoDraft,

    /// A submission is already in flight
    #[error("a submission is already in progress")]
    SubmitInFlight,
}

/// Failure of the data-source creation path.
#[derive(Debug, thiserror::Error)]
pub enum CreateSourceError {
    /// The name field is blank
    #[error("Name and Type are required.")]
    MissingName,

    /// The configuration is structurally invalid; blocks the request
    /// entirely
    #[error(transparent)]
    Invalid(#[from] SchemaError),

    /// The backend rejected the request (also recorded in the activity
    /// log)
    #[error(transparent)]
    Api(#[from] ApiError),
}
