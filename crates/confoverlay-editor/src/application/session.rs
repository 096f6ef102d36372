//! One editing session over the main configuration store.
//!
//! # Lifecycle (for beginners)
//!
//! ```text
//! open(main)  ─► staged = main.clone(); staged.hold_writes(true)
//!   select / set_value / create_scope / erase_scope   (staged only)
//! commit()    ─► staged.hold_writes(false)  (one durable save)
//!                main.adopt(staged); staged.hold_writes(true)
//! discard()   ─► staged = main.clone()     (nothing durable happens)
//! ```
//!
//! All links, the catalog and the indexer domain object share the staged
//! store handle and one [`ScopeCursor`].  Selecting a subtree writes the
//! cursor; nothing else needs to be rebuilt.
//!
//! Global-only fields get a cursor of their own that never moves, so they
//! always read and write the global scope whatever subtree is selected.

use std::collections::BTreeMap;
use std::rc::Rc;

use confoverlay_core::{shared, validate_scope, ScopeCursor, SharedStore, StoreError, GLOBAL_SCOPE};
use thiserror::Error;
use tracing::{debug, info};

use super::catalog::{normalize_scope, SubtreeCatalog};
use super::fields::{
    field_labels, find_field, ChoiceSource, Encoding, FieldKind, FieldScope, FieldSpec, FIELDS,
};
use super::indexer::IndexerSettings;
use super::link::{DiffEncodedLink, DirectLink, Link};

/// Errors reported to the presentation layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The field is not in the field table.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The text does not fit the field kind.  Nothing was written.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Data offered for choice fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceLists {
    pub mime_types: Vec<String>,
    pub stemmers: Vec<String>,
    pub charsets: Vec<String>,
}

impl ChoiceLists {
    pub fn for_source(&self, source: ChoiceSource) -> &[String] {
        match source {
            ChoiceSource::MimeTypes => &self.mime_types,
            ChoiceSource::StemmerNames => &self.stemmers,
            ChoiceSource::Charsets => &self.charsets,
        }
    }
}

/// One row of the field listing for the selected scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: &'static str,
    pub label: String,
    /// `None` means unset everywhere: the index engine uses its default.
    pub value: Option<String>,
    /// The editable layer has an entry for this field at exactly the
    /// selected scope (or, for global-only fields, at the global scope).
    pub set_here: bool,
    pub global_only: bool,
}

/// A staged editing session.
#[derive(Debug)]
pub struct EditSession {
    main: SharedStore,
    staged: SharedStore,
    cursor: ScopeCursor,
    catalog: SubtreeCatalog,
    links: Vec<(&'static FieldSpec, Link)>,
    labels: BTreeMap<String, String>,
    choices: ChoiceLists,
}

impl EditSession {
    /// Opens a session on a staged copy of `main`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if staging cannot be enabled.
    pub fn open(main: SharedStore, choices: ChoiceLists) -> Result<Self, SessionError> {
        let mut copy = main.borrow().clone();
        copy.hold_writes(true)?;
        let staged = shared(copy);
        let cursor = ScopeCursor::new();
        let global_cursor = ScopeCursor::new();
        let domain = Rc::new(IndexerSettings::new(staged.clone()));

        let mut links = Vec::with_capacity(FIELDS.len());
        for spec in FIELDS {
            let field_cursor = match spec.scope {
                FieldScope::GlobalOnly => global_cursor.clone(),
                FieldScope::Subtree => cursor.clone(),
            };
            let link = match (spec.encoding, domain.provider(spec.name)) {
                (Encoding::DiffEncoded, Some(provider)) => Link::DiffEncoded(DiffEncodedLink::new(
                    staged.clone(),
                    spec.name,
                    field_cursor,
                    domain.clone(),
                    provider,
                )),
                _ => Link::Direct(DirectLink::new(staged.clone(), spec.name, field_cursor)),
            };
            links.push((spec, link));
        }

        let labels = field_labels(domain.extra_field_names());
        info!(
            backend = %main.borrow().backend_description().unwrap_or_else(|| "memory".to_string()),
            fields = links.len(),
            "editing session opened"
        );
        Ok(Self {
            main,
            staged: staged.clone(),
            cursor,
            catalog: SubtreeCatalog::new(staged),
            links,
            labels,
            choices,
        })
    }

    /// The global scope `""` followed by the customised subtrees.
    pub fn list_scopes(&self, shallow: bool) -> Vec<String> {
        let mut scopes = vec![GLOBAL_SCOPE.to_string()];
        scopes.extend(self.catalog.list(shallow));
        scopes
    }

    /// Makes `scope` the target of every subtree field.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] for a name that cannot be stored.
    pub fn select(&mut self, scope: &str) -> Result<(), SessionError> {
        let scope = normalize_scope(scope);
        validate_scope(&scope)?;
        debug!(scope = %scope, "selected scope");
        self.cursor.write(scope);
        Ok(())
    }

    pub fn selected(&self) -> String {
        self.cursor.read()
    }

    /// Current value of `field` at the selected scope.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`].
    pub fn get_value(&self, field: &str) -> Result<Option<String>, SessionError> {
        Ok(self.link(field)?.1.get())
    }

    /// Validates `text` for `field` and stores it in the staged copy.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`], [`SessionError::InvalidValue`]
    /// or a store error.  Nothing is written on error.
    pub fn set_value(&mut self, field: &str, text: &str) -> Result<(), SessionError> {
        let (spec, link) = self.link(field)?;
        spec.validate(text).map_err(|reason| SessionError::InvalidValue {
            field: field.to_string(),
            reason,
        })?;
        link.set(text)?;
        Ok(())
    }

    /// Every field that can be edited at the selected scope.  At the global
    /// scope all fields are listed; at a subtree only the subtree fields.
    pub fn fields(&self) -> Vec<FieldView> {
        let at_global = self.cursor.is_global();
        self.links
            .iter()
            .filter(|(spec, _)| at_global || spec.scope == FieldScope::Subtree)
            .map(|(spec, link)| FieldView {
                name: spec.name,
                label: self
                    .labels
                    .get(spec.name)
                    .cloned()
                    .unwrap_or_else(|| spec.name.to_string()),
                value: link.get(),
                set_here: link.is_set_here(),
                global_only: spec.scope == FieldScope::GlobalOnly,
            })
            .collect()
    }

    /// Labels of the known fields and of any extra keys found at open time.
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Values offered for a choice field; empty for other kinds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`].
    pub fn choices(&self, field: &str) -> Result<&[String], SessionError> {
        let spec = find_field(field).ok_or_else(|| SessionError::UnknownField(field.to_string()))?;
        let offered: &[String] = match spec.kind {
            FieldKind::Choice(source) | FieldKind::ChoiceList(source) => {
                self.choices.for_source(source)
            }
            _ => &[],
        };
        Ok(offered)
    }

    /// Registers a new subtree in the staged copy.  Returns its normalized
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] for the global scope or a name
    /// that cannot be stored.
    pub fn create_scope(&mut self, scope: &str) -> Result<String, SessionError> {
        Ok(self.catalog.create(scope)?)
    }

    /// Erases a subtree from the staged copy.  If it was selected, the
    /// selection returns to the global scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] for the global scope.
    pub fn erase_scope(&mut self, scope: &str) -> Result<bool, SessionError> {
        let erased = self.catalog.erase(scope)?;
        if self.cursor.read() == normalize_scope(scope) {
            self.cursor.write(GLOBAL_SCOPE);
        }
        Ok(erased)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.staged.borrow().has_pending_writes()
    }

    /// Flushes the staged copy in one durable write and makes the main store
    /// reflect it.  The session stays open for further edits.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the flush fails.  The staged
    /// changes are kept and the commit may be retried.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        let mut staged = self.staged.borrow_mut();
        let pending = staged.has_pending_writes();
        staged.hold_writes(false)?;
        self.main.borrow_mut().adopt(&staged);
        staged.hold_writes(true)?;
        info!(pending, "editing session committed");
        Ok(())
    }

    /// Drops every staged change; the session restarts from the main store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if staging cannot be re-enabled.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        let mut fresh = self.main.borrow().clone();
        fresh.hold_writes(true)?;
        *self.staged.borrow_mut() = fresh;
        info!("editing session discarded");
        Ok(())
    }

    /// The main store this session edits.
    pub fn main(&self) -> &SharedStore {
        &self.main
    }

    fn link(&self, field: &str) -> Result<&(&'static FieldSpec, Link), SessionError> {
        self.links
            .iter()
            .find(|(spec, _)| spec.name == field)
            .ok_or_else(|| SessionError::UnknownField(field.to_string()))
    }
}
