//! Persistence format and storage abstraction.
//!
//! - **`document`** – the in-memory `scope → key → value` map of one layer.
//! - **`codec`** – conversion between a document and sectioned text.
//! - **`backend`** – the `ConfigBackend` trait used by the store to load and
//!   flush the editable layer, plus an in-memory implementation.
//!
//! Keeping the text format here, separate from the store, means the store's
//! lookup and staging rules never depend on how bytes are laid out on disk.

pub mod backend;
pub mod codec;
pub mod document;
