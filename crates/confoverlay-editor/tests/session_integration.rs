//! Integration tests for editing sessions over real files.
//!
//! These tests exercise the editor end-to-end: `FileBackend` + system layer +
//! `EditSession`, checking what actually lands on disk.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use confoverlay_core::{shared, ConfigBackend, ConfigStore, SharedStore};
use confoverlay_editor::application::session::{ChoiceLists, EditSession, SessionError};
use confoverlay_editor::infrastructure::storage::file_backend::{load_document, FileBackend};
use uuid::Uuid;

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("confoverlay_it_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn user_file(&self) -> PathBuf {
        self.dir.join("index.conf")
    }

    fn write_system(&self, text: &str) -> PathBuf {
        let path = self.dir.join("system.conf");
        fs::write(&path, text).unwrap();
        path
    }

    fn open_main(&self, system: Option<&PathBuf>) -> SharedStore {
        let backend = Arc::new(FileBackend::new(self.user_file()));
        let mut store = ConfigStore::open(backend).unwrap();
        if let Some(path) = system {
            store = store.with_lower_layer(load_document(path).unwrap());
        }
        shared(store)
    }

    fn read_user_file(&self) -> String {
        fs::read_to_string(self.user_file()).unwrap_or_default()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_commit_writes_sectioned_file() {
    // Arrange
    let fx = Fixture::new();
    let mut session = EditSession::open(fx.open_main(None), ChoiceLists::default()).unwrap();

    // Act
    session.set_value("topdirs", "~/docs ~/src").unwrap();
    session.select("/home/me/tmp").unwrap();
    session.set_value("followLinks", "1").unwrap();
    session.commit().unwrap();

    // Assert
    let text = fx.read_user_file();
    assert!(text.contains("topdirs = ~/docs ~/src"), "{text}");
    assert!(text.contains("[/home/me/tmp]"), "{text}");
    let reread = FileBackend::new(fx.user_file()).load().unwrap();
    assert_eq!(reread.get("/home/me/tmp", "followLinks"), Some("1"));
}

#[test]
fn test_discard_leaves_file_untouched() {
    let fx = Fixture::new();
    fs::write(fx.user_file(), "loglevel = 2\n").unwrap();
    let before = fx.read_user_file();
    let mut session = EditSession::open(fx.open_main(None), ChoiceLists::default()).unwrap();

    session.set_value("loglevel", "6").unwrap();
    session.create_scope("/data").unwrap();
    session.discard().unwrap();
    drop(session);

    assert_eq!(fx.read_user_file(), before);
}

#[test]
fn test_dropping_session_without_commit_writes_nothing() {
    let fx = Fixture::new();
    let mut session = EditSession::open(fx.open_main(None), ChoiceLists::default()).unwrap();

    session.set_value("loglevel", "6").unwrap();
    drop(session);

    assert!(!fx.user_file().exists());
}

#[test]
fn test_diff_encoded_edit_tracks_system_default_changes() {
    // Arrange: the system layer ships a base list
    let fx = Fixture::new();
    let system = fx.write_system("skippedNames = a b c\n");
    let mut session =
        EditSession::open(fx.open_main(Some(&system)), ChoiceLists::default()).unwrap();
    session.select("/src").unwrap();
    session.set_value("skippedNames", "b d").unwrap();
    session.commit().unwrap();
    drop(session);

    // Act: a later system release changes the base
    fx.write_system("skippedNames = b c e\n");
    let mut reopened =
        EditSession::open(fx.open_main(Some(&system)), ChoiceLists::default()).unwrap();
    reopened.select("/src").unwrap();
    let value = reopened.get_value("skippedNames").unwrap().unwrap();

    // Assert: user removal of a and c plus addition of d survive, e appears
    let mut words: Vec<&str> = value.split_whitespace().collect();
    words.sort_unstable();
    assert_eq!(words, vec!["b", "d", "e"]);
    let text = fx.read_user_file();
    assert!(text.contains("skippedNames+ = d"), "{text}");
    assert!(text.contains("skippedNames- = a c"), "{text}");
}

#[test]
fn test_system_subtrees_are_listed_only_when_not_shallow() {
    let fx = Fixture::new();
    let system = fx.write_system("[~/.thunderbird]\nskippedNames+ = *.msf\n");
    let mut session =
        EditSession::open(fx.open_main(Some(&system)), ChoiceLists::default()).unwrap();
    session.create_scope("/home/me/mail").unwrap();

    assert_eq!(session.list_scopes(true), vec!["", "/home/me/mail"]);
    assert_eq!(
        session.list_scopes(false),
        vec!["", "/home/me/mail", "~/.thunderbird"]
    );
}

#[test]
fn test_erase_scope_is_exact_on_disk() {
    let fx = Fixture::new();
    fs::write(
        fx.user_file(),
        "loglevel = 3\n[sub1]\nfollowLinks = 1\n[sub1/child]\nfollowLinks = 0\n",
    )
    .unwrap();
    let mut session = EditSession::open(fx.open_main(None), ChoiceLists::default()).unwrap();

    assert!(session.erase_scope("sub1").unwrap());
    session.commit().unwrap();

    let doc = load_document(&fx.user_file()).unwrap();
    assert!(!doc.has_section("sub1"));
    assert_eq!(doc.get("sub1/child", "followLinks"), Some("0"));
    assert_eq!(doc.get("", "loglevel"), Some("3"));
}

#[test]
fn test_erase_global_scope_is_rejected() {
    let fx = Fixture::new();
    let mut session = EditSession::open(fx.open_main(None), ChoiceLists::default()).unwrap();

    let result = session.erase_scope("");

    assert!(matches!(result, Err(SessionError::Store(_))));
}

#[test]
fn test_commit_to_unwritable_location_keeps_staged_changes() {
    // Arrange: open on a missing file, then occupy its directory name with a
    // regular file so the save cannot create the directory
    let fx = Fixture::new();
    let parent = fx.dir.join("later");
    let backend = Arc::new(FileBackend::new(parent.join("index.conf")));
    let main = shared(ConfigStore::open(backend).unwrap());
    fs::write(&parent, "").unwrap();
    let mut session = EditSession::open(main, ChoiceLists::default()).unwrap();
    session.set_value("loglevel", "5").unwrap();

    // Act
    let result = session.commit();

    // Assert
    assert!(result.is_err());
    assert!(session.has_pending_changes());
    assert_eq!(session.get_value("loglevel").unwrap().as_deref(), Some("5"));
    assert_eq!(session.main().borrow().get("loglevel", ""), None);
}
