//! # confoverlay-core
//!
//! Shared library for confoverlay containing the scoped configuration store,
//! the shared scope cursor, the plus/minus diff engine, and the sectioned
//! text codec used to persist configuration documents.
//!
//! It has zero dependencies on OS APIs, UI frameworks, or process execution.
//! The only I/O-shaped item is the [`ConfigBackend`] trait; concrete file
//! storage lives in the editor crate.
//!
//! # Architecture overview (for beginners)
//!
//! Settings are stored per *scope*.  The empty scope `""` is the global
//! section; any other scope (usually a directory path such as
//! `/home/me/tmp`) overrides global values for that subtree only:
//!
//! - **`domain`** – Pure business logic.  [`ConfigStore`] resolves
//!   `(scope, key)` lookups with fallback to the global scope and supports
//!   staged editing; [`ScopeCursor`] names the scope currently being edited;
//!   [`diff`](domain::diff) turns an edited list into a durable
//!   additions/removals pair.
//!
//! - **`persistence`** – How a [`ConfigDocument`] becomes text on disk and
//!   back, plus the [`ConfigBackend`] abstraction and an in-memory backend.

pub mod domain;
pub mod persistence;

pub use domain::diff::{apply_delta, compute_delta, join_words, split_words, PlusMinus};
pub use domain::scope::{validate_scope, ScopeCursor, GLOBAL_SCOPE};
pub use domain::store::{shared, ConfigStore, SharedStore, StoreError};
pub use persistence::backend::{ConfigBackend, MemoryBackend, PersistenceError};
pub use persistence::codec::{parse_document, serialize_document, FormatError};
pub use persistence::document::ConfigDocument;
