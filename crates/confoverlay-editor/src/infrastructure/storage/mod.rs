//! Storage infrastructure: file persistence.
//!
//! - `file_backend` reads and atomically rewrites the sectioned index
//!   configuration files edited by a session.
//! - `config` reads and writes the editor's own TOML settings from the
//!   platform-appropriate directory, with defaults on first run.

pub mod config;
pub mod file_backend;
