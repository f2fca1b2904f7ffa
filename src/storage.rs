//! Storage ports.
//!
//! The engine reads and writes visitor state through two injected key-value
//! scopes: a session-scoped store (cleared when the visit ends) and a
//! durable store (survives across visits). Conventionally these are backed
//! by browser `sessionStorage`/`localStorage`, but any conforming store
//! works, which is what makes evaluation testable without a browser.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

/// Error raised by a store write. Reads signal absence with `None` instead.
///
/// The engine swallows these at every call site: a visitor with storage
/// disabled still gets a display decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// A single key-value scope.
///
/// `get_item` returns `None` both for a missing key and for an unavailable
/// store; the engine treats the two identically (no marker present).
pub trait KvStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and simulation harnesses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently present.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.items.lock().clear();
    }
}

impl KvStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that behaves like disabled browser storage: every key is absent
/// and every write fails.
#[derive(Debug, Default)]
pub struct NilStore;

impl NilStore {
    pub fn new() -> Self {
        Self
    }
}

impl KvStore for NilStore {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Storage keys. Namespaced so campaigns sharing a page never collide.
pub mod keys {
    /// Session-scoped first-URL marker.
    pub const FIRST_URL_SESSION: &str = "cmp_first_url_session";

    /// Durable first-URL marker.
    pub const FIRST_URL_ALL_TIME: &str = "cmp_first_url";

    /// Durable visitor id used for A/B bucketing.
    pub const VISITOR_ID: &str = "cmp_vid";

    /// Session-scoped "shown" marker for one campaign.
    pub fn session_shown(banner_id: &str) -> String {
        format!("cmp_shown_{}", banner_id)
    }

    /// Durable per-day "shown" marker for one campaign. Holds a
    /// `YYYY-MM-DD` UTC date string.
    pub fn daily_shown(banner_id: &str) -> String {
        format!("cmp_shown_day_{}", banner_id)
    }
}
