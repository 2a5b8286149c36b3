//! Error types for the API boundary

/// Failure of a backend request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not complete at the transport level
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("{detail}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Server-supplied `detail`, or a status-derived fallback
        detail: String,
    },
}

impl ApiError {
    /// True when this is a non-2xx server response (as opposed to a
    /// transport failure).
    #[inline]
    #[must_use]
    pub fn is_server(&self) -> bool {
        matches!(self, ApiError::Server { .. })
    }
}
