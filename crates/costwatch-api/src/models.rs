//! Entity models served by the backend
//!
//! Timestamps produced by the server (`last_run_at`, `alert_time`) are
//! kept as the strings the backend emits; the client only displays them.

use costwatch_schema::ProviderKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A configured billing/metrics data source.
///
/// Immutable once created: the backend exposes no update endpoint, only
/// create and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    /// Provider kind ("type" on the wire)
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Normalized provider configuration
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Scheduling state of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Scheduled and running
    Active,
    /// Suspended by the user
    Paused,
    /// Faulted server-side; not user-togglable from the client
    Error,
}

impl CheckStatus {
    /// Wire representation.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Active => "active",
            CheckStatus::Paused => "paused",
            CheckStatus::Error => "error",
        }
    }
}

/// Outcome of the most recent check execution.
///
/// The backend emits open-ended failure strings (`failure_timeout`,
/// `error_scheduling`, ...); everything that is not one of the two known
/// outcomes is carried verbatim in `Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    NoAnomaly,
    AnomalyDetected,
    Failure(String),
}

impl RunStatus {
    /// Wire representation.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::NoAnomaly => "no_anomaly",
            RunStatus::AnomalyDetected => "anomaly_detected",
            RunStatus::Failure(raw) => raw,
        }
    }

    /// True for any outcome other than the two clean ones.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Failure(_))
    }
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "no_anomaly" => RunStatus::NoAnomaly,
            "anomaly_detected" => RunStatus::AnomalyDetected,
            _ => RunStatus::Failure(raw),
        }
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RunStatus::from(String::deserialize(deserializer)?))
    }
}

/// A natural-language scheduled check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub id: String,
    /// The natural-language query the check was parsed from
    pub query: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub suggestion: String,
    /// Data source the check runs against
    #[serde(default, alias = "dataSourceId")]
    pub data_source_id: Option<String>,
    pub status: CheckStatus,
    #[serde(default)]
    pub last_run_status: Option<RunStatus>,
    /// Server-formatted timestamp of the last execution
    #[serde(default)]
    pub last_run_at: Option<String>,
}

impl Check {
    /// A short prefix of the query for log messages.
    #[must_use]
    pub fn query_snippet(&self, max_chars: usize) -> String {
        if self.query.chars().count() <= max_chars {
            self.query.clone()
        } else {
            let prefix: String = self.query.chars().take(max_chars).collect();
            format!("{prefix}...")
        }
    }
}

/// An alert raised by the backend against a check (or the system).
///
/// Read-only from the client's perspective: alerts are produced
/// externally and only ever fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(default)]
    pub check_id: Option<String>,
    pub message: String,
    /// Server-formatted timestamp
    #[serde(default)]
    pub alert_time: String,
}

/// Coarse classification of an alert derived from its message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertClass {
    /// A check fired on an anomaly
    Anomaly,
    /// Something went wrong while executing a check
    Error,
    /// Informational
    Info,
}

/// Structured view of an alert message, when it follows the
/// `ALERT for Check <id>: <condition>. (<details>) Suggestion: <text>`
/// shape the backend emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAlert {
    Structured {
        title: String,
        condition: String,
        details: String,
        suggestion: String,
    },
    Simple(String),
}

impl Alert {
    /// Classify this alert by its message text.
    #[must_use]
    pub fn class(&self) -> AlertClass {
        let lower = self.message.to_lowercase();
        if lower.contains("alert for check") {
            AlertClass::Anomaly
        } else if lower.contains("error") {
            AlertClass::Error
        } else {
            AlertClass::Info
        }
    }

    /// Parse the message into its structured parts, falling back to the
    /// raw text.
    #[must_use]
    pub fn parse_message(&self) -> ParsedAlert {
        if !self.message.contains("ALERT for Check") {
            return ParsedAlert::Simple(self.message.clone());
        }

        let mut parens = self.message.split(['(', ')']);
        let main = parens.next().unwrap_or("");
        let details = parens.next().unwrap_or("").trim().to_string();

        let suggestion = self
            .message
            .split_once("Suggestion: ")
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default();

        let title = main
            .replacen("ALERT for Check ", "", 1)
            .split(':')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();

        let condition = main
            .split_once(": ")
            .and_then(|(_, rest)| rest.split('.').next())
            .unwrap_or("")
            .trim()
            .to_string();

        ParsedAlert::Structured {
            title,
            condition,
            details,
            suggestion,
        }
    }
}
