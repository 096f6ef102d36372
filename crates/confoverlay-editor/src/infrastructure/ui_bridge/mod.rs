//! Presentation bridge: exposes session operations to a front end.
//!
//! Every command takes the [`EditSession`] and returns a
//! [`CommandResult<T>`], so each response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.  The command
//! line front end prints these either as text or, with `--json`, verbatim.
//!
//! # Data Transfer Objects (DTOs)
//!
//! Session types borrow static field descriptions and use enums that are not
//! meant as an external format.  DTOs are plain serialisable structs built
//! from them; a front end depends only on the DTOs.

use serde::{Deserialize, Serialize};

use crate::application::fields::{find_field, Encoding, FieldKind, FieldScope, FIELDS};
use crate::application::session::{EditSession, FieldView};

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One editable field at the selected scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDto {
    pub name: String,
    pub label: String,
    /// `null` when unset everywhere (the index engine default applies).
    pub value: Option<String>,
    pub set_here: bool,
    pub global_only: bool,
    pub kind: String,
}

impl From<FieldView> for FieldDto {
    fn from(view: FieldView) -> Self {
        let kind = find_field(view.name)
            .map(|spec| describe_kind(spec.kind))
            .unwrap_or_default();
        Self {
            name: view.name.to_string(),
            label: view.label,
            value: view.value,
            set_here: view.set_here,
            global_only: view.global_only,
            kind,
        }
    }
}

/// Static description of a known field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfoDto {
    pub name: String,
    pub label: String,
    pub help: String,
    pub kind: String,
    pub global_only: bool,
    pub diff_encoded: bool,
}

/// One entry of the scope list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDto {
    /// Scope name; empty for the global scope.
    pub name: String,
    pub label: String,
    pub selected: bool,
}

/// A field value read at a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDto {
    pub field: String,
    pub scope: String,
    pub value: Option<String>,
}

/// Unified response wrapper used by every command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }

    fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Short kind name shown next to a field.
pub fn describe_kind(kind: FieldKind) -> String {
    match kind {
        FieldKind::Bool => "bool".to_string(),
        FieldKind::Int { min, max } => format!("int {min}..{max}"),
        FieldKind::Str => "text".to_string(),
        FieldKind::StrList => "words".to_string(),
        FieldKind::DirList => "directories".to_string(),
        FieldKind::FileName { dir_only: true } => "directory".to_string(),
        FieldKind::FileName { dir_only: false } => "file".to_string(),
        FieldKind::Choice(_) => "choice".to_string(),
        FieldKind::ChoiceList(_) => "choices".to_string(),
    }
}

/// Display label of a scope name.
pub fn scope_label(scope: &str) -> String {
    if scope.is_empty() {
        "(global)".to_string()
    } else {
        scope.to_string()
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Describes every known field; needs no session.
pub fn describe_fields() -> CommandResult<Vec<FieldInfoDto>> {
    let infos = FIELDS
        .iter()
        .map(|spec| FieldInfoDto {
            name: spec.name.to_string(),
            label: spec.label.to_string(),
            help: spec.help.to_string(),
            kind: describe_kind(spec.kind),
            global_only: spec.scope == FieldScope::GlobalOnly,
            diff_encoded: spec.encoding == Encoding::DiffEncoded,
        })
        .collect();
    CommandResult::ok(infos)
}

/// Lists the fields editable at the selected scope.
pub fn list_fields(session: &EditSession) -> CommandResult<Vec<FieldDto>> {
    CommandResult::ok(session.fields().into_iter().map(FieldDto::from).collect())
}

/// Lists the global scope and the customised subtrees.
pub fn list_scopes(session: &EditSession, shallow: bool) -> CommandResult<Vec<ScopeDto>> {
    let selected = session.selected();
    let scopes = session
        .list_scopes(shallow)
        .into_iter()
        .map(|name| ScopeDto {
            label: scope_label(&name),
            selected: name == selected,
            name,
        })
        .collect();
    CommandResult::ok(scopes)
}

/// Selects the scope subsequent commands apply to.
pub fn select_scope(session: &mut EditSession, scope: &str) -> CommandResult<String> {
    CommandResult::from_result(session.select(scope).map(|()| session.selected()))
}

pub fn get_value(session: &EditSession, field: &str) -> CommandResult<ValueDto> {
    CommandResult::from_result(session.get_value(field).map(|value| ValueDto {
        field: field.to_string(),
        scope: session.selected(),
        value,
    }))
}

/// Stores `value` in the session's staged copy.
pub fn set_value(session: &mut EditSession, field: &str, value: &str) -> CommandResult<()> {
    CommandResult::from_result(session.set_value(field, value))
}

pub fn get_choices(session: &EditSession, field: &str) -> CommandResult<Vec<String>> {
    CommandResult::from_result(session.choices(field).map(<[String]>::to_vec))
}

pub fn create_scope(session: &mut EditSession, scope: &str) -> CommandResult<String> {
    CommandResult::from_result(session.create_scope(scope))
}

/// Erases a subtree; `data` tells whether it existed.
pub fn erase_scope(session: &mut EditSession, scope: &str) -> CommandResult<bool> {
    CommandResult::from_result(session.erase_scope(scope))
}

/// Persists staged changes.
pub fn commit(session: &mut EditSession) -> CommandResult<()> {
    CommandResult::from_result(session.commit())
}

pub fn discard(session: &mut EditSession) -> CommandResult<()> {
    CommandResult::from_result(session.discard())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
