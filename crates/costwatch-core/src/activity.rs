//! Bounded activity log
//!
//! Newest-first record of everything the client observed: successful
//! mutations, failed fetches, warnings about no-op actions. Capped at
//! [`MAX_ENTRIES`]; the oldest entries fall off the tail. No persistence
//! beyond process lifetime.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use ulid::Ulid;

/// Maximum number of retained entries.
pub const MAX_ENTRIES: usize = 15;

/// Unique activity entry identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub Ulid);

impl EntryId {
    /// Generate new entry ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Info,
    Success,
    Warn,
    Error,
}

impl ActivityKind {
    /// Label used when rendering entries.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Info => "INFO",
            ActivityKind::Success => "SUCCESS",
            ActivityKind::Warn => "WARN",
            ActivityKind::Error => "ERROR",
        }
    }
}

/// One recorded client-observable event.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: EntryId,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub kind: ActivityKind,
}

/// Bounded, newest-first activity log.
///
/// Cheap to clone; all handles share the same entries.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    inner: Arc<Mutex<Vec<ActivityEntry>>>,
}

impl ActivityLog {
    /// Create an empty log.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event: prepend a fresh entry and truncate to the
    /// [`MAX_ENTRIES`] most recent. Also mirrored to `tracing` at the
    /// matching level.
    pub fn record(&self, message: impl Into<String>, kind: ActivityKind) {
        let message = message.into();
        match kind {
            ActivityKind::Info | ActivityKind::Success => tracing::info!("{message}"),
            ActivityKind::Warn => tracing::warn!("{message}"),
            ActivityKind::Error => tracing::error!("{message}"),
        }

        let entry = ActivityEntry {
            id: EntryId::new(),
            timestamp: Utc::now(),
            message,
            kind,
        };

        let mut entries = self.inner.lock();
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES);
    }

    /// Snapshot of the retained entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.inner.lock().clone()
    }

    /// The most recent entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<ActivityEntry> {
        self.inner.lock().first().cloned()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_prepends_newest_first() {
        let log = ActivityLog::new();
        log.record("first", ActivityKind::Info);
        log.record("second", ActivityKind::Success);

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn length_never_exceeds_cap_and_evicts_oldest() {
        let log = ActivityLog::new();
        for i in 0..40 {
            log.record(format!("event {i}"), ActivityKind::Info);
            assert!(log.len() <= MAX_ENTRIES);
        }

        let entries = log.entries();
        assert_eq!(entries.len(), MAX_ENTRIES);
        // Newest first; the oldest surviving entry is event 25.
        assert_eq!(entries[0].message, "event 39");
        assert_eq!(entries[MAX_ENTRIES - 1].message, "event 25");
    }

    #[test]
    fn clones_share_the_same_entries() {
        let log = ActivityLog::new();
        let handle = log.clone();
        handle.record("shared", ActivityKind::Warn);

        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().unwrap().kind, ActivityKind::Warn);
    }
}
