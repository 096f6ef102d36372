//! Sectioned configuration files on disk.
//!
//! The editable layer is a single file (by default `index.conf` in the
//! configuration directory).  Writes go to a sibling temporary file named
//! `<file>.tmp-<uuid>` which is then renamed over the target, so a reader
//! never observes a half-written file and a failed save leaves the previous
//! content in place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use confoverlay_core::{
    parse_document, serialize_document, ConfigBackend, ConfigDocument, PersistenceError,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Reads a configuration file, treating a missing file as empty.
///
/// # Errors
///
/// Returns [`PersistenceError::Io`] for file-system errors other than "not
/// found" and [`PersistenceError::Parse`] for malformed content.
pub fn load_document(path: &Path) -> Result<ConfigDocument, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(text) => parse_document(&text).map_err(|source| PersistenceError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "configuration file absent, using empty document");
            Ok(ConfigDocument::new())
        }
        Err(source) => Err(PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// [`ConfigBackend`] storing the document in one file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".tmp-{}", Uuid::new_v4()));
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ConfigBackend for FileBackend {
    fn load(&self) -> Result<ConfigDocument, PersistenceError> {
        load_document(&self.path)
    }

    fn save(&self, doc: &ConfigDocument) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Self::io_error(dir, e))?;
        }

        let temp = self.temp_path();
        let text = serialize_document(doc);
        let written = fs::File::create(&temp)
            .and_then(|mut file| {
                file.write_all(text.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, &self.path));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp.display(), "could not remove temporary file: {cleanup}");
                }
            }
            return Err(Self::io_error(&self.path, e));
        }
        debug!(path = %self.path.display(), bytes = text.len(), "configuration saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
