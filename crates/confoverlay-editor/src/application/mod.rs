//! Application layer use cases for the settings editor.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules, here `confoverlay-core`) and the infrastructure
//! (files, subprocesses, terminal output).
//!
//! Use cases in this layer orchestrate domain objects to fulfil a user goal
//! and contain no file system access and no process execution.
//!
//! # Sub-modules
//!
//! - **`fields`**   – Static table of known settings: labels, help text,
//!   value kinds, and whether a field may be overridden per subtree.
//!
//! - **`indexer`**  – The domain object that computes the effective value of
//!   the two diff-encoded list settings for a selected subtree.
//!
//! - **`link`**     – Binds one field to `(store, key, scope cursor)`, either
//!   verbatim or through the plus/minus diff.
//!
//! - **`catalog`**  – Lists, creates and erases customised subtrees.
//!
//! - **`session`**  – One editing session: staged copy of the main store,
//!   one link per field, commit or discard.

pub mod catalog;
pub mod fields;
pub mod indexer;
pub mod link;
pub mod session;
