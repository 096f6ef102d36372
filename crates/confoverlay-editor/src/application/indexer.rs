//! Effective values of the diff-encoded list settings.
//!
//! The index engine reads `skippedNames` and `noContentSuffixes` as a base
//! list (the bare key, or a built-in default) adjusted by the `name+` and
//! `name-` deltas found for the directory being indexed.  [`IndexerSettings`]
//! performs that computation for the scope currently selected on it, which is
//! what the editor displays for a diff-encoded field.
//!
//! # Example (for beginners)
//!
//! ```text
//! [""]        skippedNames  = #* CVS tmp
//! [""]        skippedNames+ = build
//! [/src]      skippedNames- = tmp
//!
//! select_scope("/src")  ->  skipped_names() = [#*, CVS]
//! select_scope("")      ->  skipped_names() = [#*, CVS, tmp, build]
//! ```
//!
//! Each scope's delta replaces the global one, mirroring how the
//! configuration store resolves any other key.

use std::cell::RefCell;
use std::rc::Rc;

use confoverlay_core::{apply_delta, split_words, PlusMinus, SharedStore, GLOBAL_SCOPE};

use super::fields::find_field;

/// Key of the skipped file name patterns.
pub const SKIPPED_NAMES: &str = "skippedNames";
/// Key of the file name endings indexed by name only.
pub const NO_CONTENT_SUFFIXES: &str = "noContentSuffixes";

const DEFAULT_SKIPPED_NAMES: &[&str] = &[
    "#*",
    "CVS",
    "Cache",
    "cache*",
    ".cache",
    "caughtspam",
    "tmp",
    ".thumbnails",
    ".svn",
    "*~",
    ".beagle",
    ".git",
    ".hg",
    ".bzr",
    "loop.ps",
    ".xsession-errors",
    ".recoll*",
    "xapiandb",
    "recollrc",
    "recoll.conf",
];

const DEFAULT_NO_CONTENT_SUFFIXES: &[&str] = &[
    ".md5", ".map", ".o", ".lib", ".dll", ".a", ".sys", ".exe", ".com", ".mpp", ".mpt", ".vsd",
    ".img", ".img.gz", ".img.bz2", ".img.xz", ".image", ".image.gz", ".image.bz2", ".image.xz",
    ".dat", ".bak", ".rdf", ".log.gz", ".log", ".db", ".msf", ".pid", ",v", "~", "#",
];

/// A zero-argument provider of the merged list for the selected scope.
pub type BaseProvider = Rc<dyn Fn() -> Vec<String>>;

/// Domain object consulted by diff-encoded links.
///
/// The link selects its scope immediately before every call, so an
/// implementation only needs to remember the last selection.
pub trait ListSettingsDomain {
    /// Makes `scope` the directory subsequent queries refer to.
    fn select_scope(&self, scope: &str);

    /// The pre-edit base list for `name` at the selected scope: the bare key
    /// resolved with fallback to global, else the built-in default.  No
    /// `name+` / `name-` delta is applied.
    fn base_list(&self, name: &str) -> Vec<String>;
}

/// Indexer view of a (staged) configuration store.
pub struct IndexerSettings {
    store: SharedStore,
    key_dir: RefCell<String>,
}

impl IndexerSettings {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            key_dir: RefCell::new(GLOBAL_SCOPE.to_string()),
        }
    }

    /// Built-in base list for a diff-encoded key.
    pub fn built_in_default(name: &str) -> Option<&'static [&'static str]> {
        match name {
            SKIPPED_NAMES => Some(DEFAULT_SKIPPED_NAMES),
            NO_CONTENT_SUFFIXES => Some(DEFAULT_NO_CONTENT_SUFFIXES),
            _ => None,
        }
    }

    /// Effective skipped name patterns at the selected scope.
    pub fn skipped_names(&self) -> Vec<String> {
        self.effective_list(SKIPPED_NAMES)
    }

    /// Effective name-only suffixes at the selected scope.
    pub fn stop_suffixes(&self) -> Vec<String> {
        self.effective_list(NO_CONTENT_SUFFIXES)
    }

    /// `(base ∪ name+) \ name-` at the selected scope.
    pub fn effective_list(&self, name: &str) -> Vec<String> {
        let base = self.base_list(name);
        let delta = {
            let store = self.store.borrow();
            let key_dir = self.key_dir.borrow();
            PlusMinus::from_stored(
                store.get(&format!("{name}+"), &key_dir),
                store.get(&format!("{name}-"), &key_dir),
            )
        };
        apply_delta(base, &delta)
    }

    /// Returns the provider a diff-encoded link uses for `name`, or `None`
    /// if `name` has no list semantics.
    pub fn provider(self: &Rc<Self>, name: &str) -> Option<BaseProvider> {
        let domain = Rc::clone(self);
        let provider: BaseProvider = match name {
            SKIPPED_NAMES => Rc::new(move || domain.skipped_names()),
            NO_CONTENT_SUFFIXES => Rc::new(move || domain.stop_suffixes()),
            _ => return None,
        };
        Some(provider)
    }

    /// Global keys found in the configuration that the field table does not
    /// describe.  Delta keys (`name+` / `name-`) of known fields are omitted.
    pub fn extra_field_names(&self) -> Vec<String> {
        self.store
            .borrow()
            .keys(GLOBAL_SCOPE)
            .into_iter()
            .filter(|key| {
                let bare = key.strip_suffix(['+', '-']).unwrap_or(key);
                find_field(bare).is_none()
            })
            .collect()
    }
}

impl ListSettingsDomain for IndexerSettings {
    fn select_scope(&self, scope: &str) {
        *self.key_dir.borrow_mut() = scope.to_string();
    }

    fn base_list(&self, name: &str) -> Vec<String> {
        let store = self.store.borrow();
        match store.get(name, &self.key_dir.borrow()) {
            Some(text) => split_words(text),
            None => Self::built_in_default(name)
                .unwrap_or_default()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl std::fmt::Debug for IndexerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerSettings")
            .field("key_dir", &*self.key_dir.borrow())
            .finish_non_exhaustive()
    }
}
