//! Entity snapshot stores
//!
//! Each store owns the last-known-good snapshot of one backend
//! collection. Nothing is ever mutated in place: every successful fetch
//! or mutation produces a full replacement, so concurrent writers cannot
//! produce a torn read - the last completed write wins.

use std::sync::Arc;
use tokio::sync::RwLock;

use costwatch_api::{Alert, Check, DataSource};

/// Entities addressable by their server-assigned id.
pub trait Keyed {
    /// The entity's id.
    fn key(&self) -> &str;
}

impl Keyed for Check {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Alert {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for DataSource {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Last-known-good snapshot of one entity collection.
///
/// Cheap to clone; all handles share the same snapshot.
#[derive(Debug)]
pub struct EntityStore<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Clone> EntityStore<T> {
    /// Create an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot wholesale.
    pub async fn replace(&self, items: Vec<T>) {
        let mut guard = self.inner.write().await;
        *guard = items;
    }

    /// Clone of the current snapshot.
    #[must_use]
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    #[must_use]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[must_use]
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl<T: Clone + Keyed> EntityStore<T> {
    /// Find an entity by id in the current snapshot.
    #[must_use]
    pub async fn find(&self, id: &str) -> Option<T> {
        self.inner.read().await.iter().find(|e| e.key() == id).cloned()
    }
}

/// The three snapshots this client maintains.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    pub checks: EntityStore<Check>,
    pub alerts: EntityStore<Alert>,
    pub sources: EntityStore<DataSource>,
}

impl Stores {
    /// Create three empty stores.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
