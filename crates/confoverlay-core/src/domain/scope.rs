//! Scope names and the shared [`ScopeCursor`].
//!
//! A scope is an opaque string naming a configuration subtree.  The empty
//! string is the global scope.  The cursor itself performs no validation;
//! [`validate_scope`] is applied by the store before a scope name is used
//! for writing, because a name that cannot be written as a section header
//! would corrupt the persisted document.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::store::StoreError;

/// The distinguished global scope.
pub const GLOBAL_SCOPE: &str = "";

/// Checks that `scope` can be used as a section name.
///
/// The global scope is always valid.  Other names must not contain section
/// delimiters (`[`, `]`) or control characters, and must not start or end
/// with whitespace (the codec trims header text).
///
/// # Errors
///
/// Returns [`StoreError::InvalidScope`] describing the offending property.
pub fn validate_scope(scope: &str) -> Result<(), StoreError> {
    if scope == GLOBAL_SCOPE {
        return Ok(());
    }
    let reason = if scope.contains(['[', ']']) {
        Some("section delimiters are not allowed")
    } else if scope.chars().any(char::is_control) {
        Some("control characters are not allowed")
    } else if scope.trim() != scope {
        Some("leading or trailing whitespace is not allowed")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoreError::InvalidScope {
            scope: scope.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Shared selector naming the scope currently being edited.
///
/// Cloning a `ScopeCursor` yields another handle to the *same* slot, so every
/// link built from a clone observes [`write`](Self::write) on its next access
/// and never needs to be rebuilt.  Handles are reference counted: the slot
/// lives as long as the last link referencing it.
///
/// The cursor is single-threaded by construction (`Rc<RefCell<_>>`); the
/// editing session is driven by one sequential event source.
#[derive(Clone, Default)]
pub struct ScopeCursor {
    slot: Rc<RefCell<String>>,
}

impl ScopeCursor {
    /// Creates a cursor pointing at the global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently selected scope.
    pub fn read(&self) -> String {
        self.slot.borrow().clone()
    }

    /// Retargets every link sharing this cursor.
    pub fn write(&self, scope: impl Into<String>) {
        *self.slot.borrow_mut() = scope.into();
    }

    /// Returns `true` when the global scope is selected.
    pub fn is_global(&self) -> bool {
        self.slot.borrow().as_str() == GLOBAL_SCOPE
    }

    /// Returns `true` if `other` is a handle to the same slot.
    pub fn shares_slot_with(&self, other: &ScopeCursor) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for ScopeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopeCursor").field(&*self.slot.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_points_at_global() {
        let cursor = ScopeCursor::new();
        assert_eq!(cursor.read(), GLOBAL_SCOPE);
        assert!(cursor.is_global());
    }

    #[test]
    fn test_write_is_visible_through_every_clone() {
        // Arrange
        let cursor = ScopeCursor::new();
        let held_by_link_a = cursor.clone();
        let held_by_link_b = cursor.clone();

        // Act
        cursor.write("/home/me/tmp");

        // Assert
        assert_eq!(held_by_link_a.read(), "/home/me/tmp");
        assert_eq!(held_by_link_b.read(), "/home/me/tmp");
        assert!(held_by_link_a.shares_slot_with(&held_by_link_b));
    }

    #[test]
    fn test_independent_cursors_do_not_share_slot() {
        let a = ScopeCursor::new();
        let b = ScopeCursor::new();
        a.write("sub1");
        assert!(b.is_global());
        assert!(!a.shares_slot_with(&b));
    }

    #[test]
    fn test_cursor_accepts_unvalidated_names() {
        let cursor = ScopeCursor::new();
        cursor.write("[weird]");
        assert_eq!(cursor.read(), "[weird]");
    }

    #[test]
    fn test_validate_scope_accepts_global_and_paths() {
        assert!(validate_scope("").is_ok());
        assert!(validate_scope("/home/me/tmp").is_ok());
        assert!(validate_scope("sub1/child").is_ok());
        assert!(validate_scope("dir with spaces").is_ok());
    }

    #[test]
    fn test_validate_scope_rejects_section_delimiters() {
        let err = validate_scope("a]b").unwrap_err();
        assert!(matches!(err, StoreError::InvalidScope { .. }));
    }

    #[test]
    fn test_validate_scope_rejects_control_characters() {
        assert!(validate_scope("a\nb").is_err());
        assert!(validate_scope("tab\there").is_err());
    }

    #[test]
    fn test_validate_scope_rejects_surrounding_whitespace() {
        assert!(validate_scope(" /tmp").is_err());
        assert!(validate_scope("/tmp ").is_err());
    }
}
