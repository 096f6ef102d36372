//! Infrastructure layer for the settings editor.
//!
//! Contains OS-facing adapters: configuration file storage, the system
//! charset enumeration subprocess, and the presentation bridge used by the
//! command-line front end.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `confoverlay_core`, but MUST NOT be imported by the `application` layer.

pub mod charsets;
pub mod storage;
pub mod ui_bridge;
