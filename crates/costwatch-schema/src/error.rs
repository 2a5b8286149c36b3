//! Error types for the schema crate

/// Unknown provider wire identifier.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown provider kind: {0}")]
pub struct ParseProviderError(pub String);

/// Structural configuration validation failure.
///
/// Raised purely client-side, before any network call is issued. The
/// field labels are surfaced verbatim to the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    /// One or more required fields (or either/or branches) unsatisfied
    #[error("missing required fields: {}", missing.join(", "))]
    MissingFields {
        /// Labels of the unsatisfied requirements
        missing: Vec<String>,
    },
}

impl SchemaError {
    /// Labels of the unsatisfied requirements, if any.
    #[inline]
    #[must_use]
    pub fn missing_fields(&self) -> &[String] {
        match self {
            SchemaError::MissingFields { missing } => missing,
        }
    }
}
