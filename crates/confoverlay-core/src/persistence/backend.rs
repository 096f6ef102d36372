//! Durable storage abstraction for the editable configuration layer.
//!
//! # Testability
//!
//! The `ConfigBackend` trait allows the store to be exercised without a
//! file system.  The production implementation (`FileBackend`) lives in the
//! editor crate; tests use [`MemoryBackend`], which can be told to reject
//! writes to simulate an unwritable target.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use super::codec::FormatError;
use super::document::ConfigDocument;

/// Error type for durable storage operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored text could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// The backend refused the write.
    #[error("write rejected by {target}: {reason}")]
    Rejected { target: String, reason: String },
}

/// Loads and stores the whole editable document as one unit.
///
/// `save` must be all-or-nothing: after a failed `save` the previously
/// stored document must still be what `load` returns.
pub trait ConfigBackend: fmt::Debug + Send + Sync {
    /// Reads the stored document.  A missing target is an empty document.
    fn load(&self) -> Result<ConfigDocument, PersistenceError>;
    /// Replaces the stored document.
    fn save(&self, doc: &ConfigDocument) -> Result<(), PersistenceError>;
    /// Human-readable name of the storage target, for logs and errors.
    fn describe(&self) -> String;
}

/// In-memory backend with write-failure injection.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    stored: Mutex<ConfigDocument>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend already holding `doc`.
    pub fn with_document(doc: ConfigDocument) -> Self {
        Self {
            stored: Mutex::new(doc),
            ..Self::default()
        }
    }

    /// Makes subsequent `save` calls fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of what is durably stored.
    pub fn snapshot(&self) -> ConfigDocument {
        self.stored
            .lock()
            .map(|doc| doc.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigBackend for MemoryBackend {
    fn load(&self) -> Result<ConfigDocument, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save(&self, doc: &ConfigDocument) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Rejected {
                target: self.describe(),
                reason: "write failure injected".to_string(),
            });
        }
        let mut stored = self
            .stored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stored = doc.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
