//! Domain entities for confoverlay.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: it can be compiled and tested on any platform without a
//! configuration directory, a subprocess, or a terminal.
//!
//! Code in outer layers (the editor's application and infrastructure layers)
//! depends on the domain, but the domain never depends on them.

/// Plus/minus set difference used by diff-encoded list settings.
pub mod diff;

/// Scope names and the shared scope cursor.
pub mod scope;

/// The layered, stageable configuration store.
///
/// See [`store::ConfigStore`] for the main type.
pub mod store;
