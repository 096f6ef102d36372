//! Listing and maintenance of customised subtrees.

use confoverlay_core::{validate_scope, SharedStore, StoreError, GLOBAL_SCOPE};
use tracing::info;

/// Strips trailing path separators so `/home/me/` and `/home/me` name the
/// same subtree.  A lone `/` is kept.
pub fn normalize_scope(scope: &str) -> String {
    let trimmed = scope.trim_end_matches('/');
    if trimmed.is_empty() && !scope.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The set of subtrees that carry their own settings.
#[derive(Debug, Clone)]
pub struct SubtreeCatalog {
    store: SharedStore,
}

impl SubtreeCatalog {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Non-global scopes in order.  With `shallow` only the editable layer is
    /// consulted; otherwise subtrees defined by the system layer are listed
    /// too.
    pub fn list(&self, shallow: bool) -> Vec<String> {
        self.store.borrow().sub_scopes(shallow)
    }

    /// Registers a subtree so it is listed before any value is set there.
    /// Returns the normalized name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] for the global scope or a name
    /// that cannot be stored.
    pub fn create(&self, scope: &str) -> Result<String, StoreError> {
        let scope = normalize_scope(scope);
        if scope == GLOBAL_SCOPE {
            return Err(StoreError::InvalidScope {
                scope,
                reason: "the global scope always exists",
            });
        }
        validate_scope(&scope)?;
        self.store.borrow_mut().create_scope(&scope)?;
        info!(scope = %scope, "created subtree");
        Ok(scope)
    }

    /// Removes every setting stored for exactly `scope`.  Returns `true` if
    /// the subtree existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidScope`] when asked to erase the global
    /// scope; nothing is changed in that case.
    pub fn erase(&self, scope: &str) -> Result<bool, StoreError> {
        let scope = normalize_scope(scope);
        let erased = self.store.borrow_mut().erase_scope(&scope)?;
        if erased {
            info!(scope = %scope, "erased subtree");
        }
        Ok(erased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confoverlay_core::{shared, ConfigDocument, ConfigStore};

    fn catalog() -> (SharedStore, SubtreeCatalog) {
        let mut system = ConfigDocument::new();
        system.set("~/.thunderbird", "skippedNames+", "*.msf");
        let store = shared(ConfigStore::in_memory().with_lower_layer(system));
        (store.clone(), SubtreeCatalog::new(store))
    }

    #[test]
    fn test_normalize_scope() {
        assert_eq!(normalize_scope("/home/me/"), "/home/me");
        assert_eq!(normalize_scope("/home/me//"), "/home/me");
        assert_eq!(normalize_scope("/"), "/");
        assert_eq!(normalize_scope(""), "");
    }

    #[test]
    fn test_list_shallow_hides_system_subtrees() {
        // Arrange
        let (store, catalog) = catalog();
        store.borrow_mut().set("followLinks", "1", "/src").unwrap();

        // Act / Assert
        assert_eq!(catalog.list(true), vec!["/src"]);
        assert_eq!(catalog.list(false), vec!["/src", "~/.thunderbird"]);
    }

    #[test]
    fn test_create_normalizes_and_lists() {
        let (_store, catalog) = catalog();

        let name = catalog.create("/data/photos/").unwrap();

        assert_eq!(name, "/data/photos");
        assert_eq!(catalog.list(true), vec!["/data/photos"]);
    }

    #[test]
    fn test_create_rejects_global_and_malformed() {
        let (_store, catalog) = catalog();
        assert!(matches!(catalog.create(""), Err(StoreError::InvalidScope { .. })));
        assert!(matches!(catalog.create("/a]b"), Err(StoreError::InvalidScope { .. })));
    }

    #[test]
    fn test_erase_global_is_rejected() {
        let (store, catalog) = catalog();
        store.borrow_mut().set("loglevel", "3", "").unwrap();

        assert!(matches!(catalog.erase(""), Err(StoreError::InvalidScope { .. })));
        assert_eq!(store.borrow().get("loglevel", ""), Some("3"));
    }

    #[test]
    fn test_erase_removes_only_exact_subtree() {
        let (store, catalog) = catalog();
        store.borrow_mut().set("k", "v", "sub1").unwrap();
        store.borrow_mut().set("k", "v", "sub1/child").unwrap();

        assert!(catalog.erase("sub1/").unwrap());

        assert_eq!(catalog.list(true), vec!["sub1/child"]);
        assert!(!catalog.erase("sub1").unwrap());
    }
}
