//! Layered, stageable configuration store.
//!
//! The store keeps one *editable* [`ConfigDocument`] on top of zero or more
//! read-only *lower layers* (system-wide defaults).  Lookups walk the layers
//! from top to bottom; within each layer the requested scope is tried first
//! and the global scope second:
//!
//! ```text
//! get("followLinks", "/home/me/tmp")
//!   editable: [/home/me/tmp] followLinks?  -> [""] followLinks?
//!   system:   [/home/me/tmp] followLinks?  -> [""] followLinks?
//!   -> None  (caller uses its built-in default)
//! ```
//!
//! # Staged editing
//!
//! An editing session clones the main store and calls
//! [`hold_writes(true)`](ConfigStore::hold_writes) on the clone.  From then
//! on writes stay in memory; the main store does not see them.  Calling
//! `hold_writes(false)` flushes the whole editable document to the backend in
//! one `save`.  If the flush fails the staged document is kept and the store
//! stays in holding mode, so the caller can retry or drop the clone.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use super::scope::{validate_scope, GLOBAL_SCOPE};
use crate::persistence::backend::{ConfigBackend, PersistenceError};
use crate::persistence::document::ConfigDocument;

/// Errors reported by [`ConfigStore`] operations.
///
/// A missing key is not an error: lookups return `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The scope cannot be used (malformed name, or erasing the global scope).
    #[error("invalid scope {scope:?}: {reason}")]
    InvalidScope { scope: String, reason: &'static str },

    /// The key cannot be represented in the persisted layout.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The value cannot be represented in the persisted layout.
    #[error("invalid value for {key:?}: {reason}")]
    InvalidValue { key: String, reason: &'static str },

    /// Writing to durable storage failed.  In-memory state is unchanged
    /// (write-through) or still staged (flush).
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// A store shared by the links, catalog and domain object of one session.
pub type SharedStore = Rc<RefCell<ConfigStore>>;

/// Wraps a store for sharing within one single-threaded session.
pub fn shared(store: ConfigStore) -> SharedStore {
    Rc::new(RefCell::new(store))
}

/// Scoped key/value store with lower read-only layers and staged writes.
///
/// `Clone` produces an independent staged copy: documents are deep-copied,
/// only the (immutable) backend handle and lower layers are shared.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    document: ConfigDocument,
    lower: Vec<Arc<ConfigDocument>>,
    backend: Option<Arc<dyn ConfigBackend>>,
    holding: bool,
    dirty: bool,
}

impl ConfigStore {
    /// Creates an empty store that is never persisted.
    pub fn in_memory() -> Self {
        Self::from_document(ConfigDocument::new())
    }

    /// Creates a memory-only store holding `document`.
    pub fn from_document(document: ConfigDocument) -> Self {
        Self {
            document,
            lower: Vec::new(),
            backend: None,
            holding: false,
            dirty: false,
        }
    }

    /// Opens a store whose editable layer is loaded from `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the backend cannot be read.
    pub fn open(backend: Arc<dyn ConfigBackend>) -> Result<Self, StoreError> {
        let document = backend.load()?;
        debug!(backend = %backend.describe(), "loaded editable configuration");
        Ok(Self {
            backend: Some(backend),
            ..Self::from_document(document)
        })
    }

    /// Adds a read-only layer below every existing layer.
    pub fn with_lower_layer(mut self, layer: ConfigDocument) -> Self {
        self.lower.push(Arc::new(layer));
        self
    }

    /// Looks up `key` for `scope`, falling back to the global scope.
    ///
    /// Layers are consulted top to bottom; the first layer holding either
    /// `(scope, key)` or `("", key)` answers.
    pub fn get(&self, key: &str, scope: &str) -> Option<&str> {
        self.layers().find_map(|layer| {
            layer.get(scope, key).or_else(|| {
                if scope == GLOBAL_SCOPE {
                    None
                } else {
                    layer.get(GLOBAL_SCOPE, key)
                }
            })
        })
    }

    /// Exact lookup in the editable layer only, without fallback.
    pub fn get_local(&self, key: &str, scope: &str) -> Option<&str> {
        self.document.get(scope, key)
    }

    /// Writes `key = value` at `scope`.
    ///
    /// The value is stored trimmed, as it would be read back from disk.  No
    /// comparison with the inherited value is made: the scope always gets its
    /// own explicit entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`], [`StoreError::InvalidKey`] or
    /// [`StoreError::InvalidValue`] without mutating anything, or
    /// [`StoreError::Persistence`] if a write-through save fails.
    pub fn set(&mut self, key: &str, value: &str, scope: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)], scope)
    }

    /// Writes several keys at `scope` as one unit: all or none.
    ///
    /// # Errors
    ///
    /// As for [`set`](Self::set).  Validation of every entry happens before
    /// any of them is applied.
    pub fn set_many<K, V>(&mut self, entries: &[(K, V)], scope: &str) -> Result<(), StoreError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        validate_scope(scope)?;
        for (key, value) in entries {
            validate_key(key.as_ref())?;
            validate_value(key.as_ref(), value.as_ref())?;
        }
        debug!(scope, count = entries.len(), "setting configuration values");
        self.mutate(|doc| {
            for (key, value) in entries {
                doc.set(scope, key.as_ref(), value.as_ref().trim());
            }
        })
    }

    /// Removes `key` from `scope` in the editable layer, so the scope inherits
    /// again.  Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] or [`StoreError::Persistence`].
    pub fn remove(&mut self, key: &str, scope: &str) -> Result<bool, StoreError> {
        validate_scope(scope)?;
        if self.document.get(scope, key).is_none() {
            return Ok(false);
        }
        self.mutate(|doc| {
            doc.remove(scope, key);
        })?;
        Ok(true)
    }

    /// Registers `scope` in the editable layer so it is listed even before
    /// any key is set there.  Creating the global scope is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] or [`StoreError::Persistence`].
    pub fn create_scope(&mut self, scope: &str) -> Result<(), StoreError> {
        validate_scope(scope)?;
        if self.document.has_section(scope) {
            return Ok(());
        }
        self.mutate(|doc| doc.ensure_section(scope))
    }

    /// Removes every `(scope, *)` entry of the editable layer in one
    /// operation.  Matching is exact: `sub1/child` survives erasing `sub1`.
    /// Returns `true` if the scope existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] for the global scope or a
    /// malformed name, [`StoreError::Persistence`] if write-through fails.
    pub fn erase_scope(&mut self, scope: &str) -> Result<bool, StoreError> {
        if scope == GLOBAL_SCOPE {
            return Err(StoreError::InvalidScope {
                scope: scope.to_string(),
                reason: "the global scope cannot be erased",
            });
        }
        validate_scope(scope)?;
        if !self.document.has_section(scope) {
            return Ok(false);
        }
        debug!(scope, "erasing scope");
        self.mutate(|doc| {
            doc.remove_section(scope);
        })?;
        Ok(true)
    }

    /// Lists non-global scopes in order.
    ///
    /// With `shallow` only scopes of the editable layer are returned;
    /// otherwise scopes defined in lower layers are included.
    pub fn sub_scopes(&self, shallow: bool) -> Vec<String> {
        let mut names: BTreeSet<&str> = self.document.subsection_names().collect();
        if !shallow {
            for layer in &self.lower {
                names.extend(layer.subsection_names());
            }
        }
        names.into_iter().map(str::to_owned).collect()
    }

    /// Keys defined exactly at `scope` in any layer, in order.
    pub fn keys(&self, scope: &str) -> Vec<String> {
        let names: BTreeSet<&str> = self.layers().flat_map(|layer| layer.keys(scope)).collect();
        names.into_iter().map(str::to_owned).collect()
    }

    /// Enables or disables staged writing.
    ///
    /// Disabling flushes the staged editable document in a single backend
    /// `save`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the flush fails; the store then
    /// remains in holding mode with its staged data intact.
    pub fn hold_writes(&mut self, enable: bool) -> Result<(), StoreError> {
        if enable {
            self.holding = true;
            return Ok(());
        }
        if !self.holding {
            return Ok(());
        }
        if self.dirty {
            if let Some(backend) = &self.backend {
                if let Err(e) = backend.save(&self.document) {
                    error!(
                        backend = %backend.describe(),
                        "flushing staged configuration failed: {e}"
                    );
                    return Err(e.into());
                }
                debug!(backend = %backend.describe(), "flushed staged configuration");
            }
        }
        self.holding = false;
        self.dirty = false;
        Ok(())
    }

    /// Returns `true` while writes are being staged.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Returns `true` if staged writes have not been flushed yet.
    pub fn has_pending_writes(&self) -> bool {
        self.dirty
    }

    /// The editable layer.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Replaces this store's editable layer with the one of a committed copy.
    pub fn adopt(&mut self, committed: &ConfigStore) {
        self.document = committed.document.clone();
    }

    /// Re-reads the editable layer from the backend, dropping staged writes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the backend cannot be read.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        if let Some(backend) = &self.backend {
            self.document = backend.load()?;
        }
        self.dirty = false;
        Ok(())
    }

    /// Describes the durable target, if any.
    pub fn backend_description(&self) -> Option<String> {
        self.backend.as_ref().map(|b| b.describe())
    }

    fn layers(&self) -> impl Iterator<Item = &ConfigDocument> {
        std::iter::once(&self.document).chain(self.lower.iter().map(|layer| &**layer))
    }

    /// Applies `change` either in memory (holding, or no backend) or through
    /// the backend first (write-through), so a failed save leaves the
    /// document untouched.
    fn mutate(&mut self, change: impl FnOnce(&mut ConfigDocument)) -> Result<(), StoreError> {
        match &self.backend {
            Some(backend) if !self.holding => {
                let mut next = self.document.clone();
                change(&mut next);
                backend.save(&next)?;
                self.document = next;
            }
            _ => {
                change(&mut self.document);
                if self.holding {
                    self.dirty = true;
                }
            }
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let reason = if key.is_empty() {
        Some("key is empty")
    } else if key.contains(|c: char| c.is_whitespace() || c.is_control() || c == '=') {
        Some("whitespace, control characters and '=' are not allowed")
    } else if key.starts_with(['[', '#']) {
        Some("key may not start with '[' or '#'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn validate_value(key: &str, value: &str) -> Result<(), StoreError> {
    let reason = if value.contains(['\n', '\r']) {
        Some("line breaks are not allowed")
    } else if value.trim_end().ends_with('\\') {
        Some("a trailing backslash would continue the line")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoreError::InvalidValue {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
