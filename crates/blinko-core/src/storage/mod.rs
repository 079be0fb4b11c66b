//! Durable local key-value storage.
//!
//! Backs client-side state that must survive a restart, such as drafts. All
//! operations are synchronous so a write is on disk before the call returns.

mod file;
mod memory;

use std::sync::Arc;

use crate::error::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Synchronous string key-value store.
pub trait LocalStorage: Send + Sync {
    /// Read a value; absence is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Prefixes every key with a user/session scope.
pub struct ScopedStorage<S> {
    inner: S,
    scope: String,
}

impl<S: LocalStorage> ScopedStorage<S> {
    pub fn new(inner: S, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn scoped_key(&self, key: &str) -> String {
        format!("{}:{key}", self.scope)
    }
}

impl<S: LocalStorage> LocalStorage for ScopedStorage<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(&self.scoped_key(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(&self.scoped_key(key), value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(&self.scoped_key(key))
    }
}
