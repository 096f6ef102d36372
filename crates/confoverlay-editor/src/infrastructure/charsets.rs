//! Enumeration of the character sets known to the system.
//!
//! The default charset field offers the names printed by `iconv -l`.  The
//! command runs on the Tokio runtime with a timeout; any failure (missing
//! binary, non-zero exit, timeout) leaves the field with only the empty
//! "locale default" choice and is logged, never reported to the user as an
//! error.
//!
//! # Testability
//!
//! [`CharsetLister`] is the capability the editor depends on.  Tests use the
//! generated `MockCharsetLister` instead of spawning processes.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Error type for charset enumeration.
#[derive(Debug, Error)]
pub enum CharsetError {
    /// The command could not be started.
    #[error("could not run charset command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The command did not finish in time.
    #[error("charset command timed out after {0:?}")]
    Timeout(Duration),

    /// The command exited unsuccessfully.
    #[error("charset command failed with exit code {code:?}")]
    Failed { code: Option<i32> },
}

/// Source of character set names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharsetLister: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, CharsetError>;
}

/// Runs an external command (by default `iconv -l`) and parses its output.
#[derive(Debug, Clone)]
pub struct IconvCharsets {
    program: String,
    args: Vec<String>,
    limit: Duration,
}

impl IconvCharsets {
    /// Builds a lister from a whitespace-separated command line.  An empty
    /// command line falls back to `iconv -l`.
    pub fn new(command: &str, limit: Duration) -> Self {
        let mut words = command.split_whitespace().map(str::to_owned);
        match words.next() {
            Some(program) => Self {
                program,
                args: words.collect(),
                limit,
            },
            None => Self {
                program: "iconv".to_string(),
                args: vec!["-l".to_string()],
                limit,
            },
        }
    }
}

#[async_trait]
impl CharsetLister for IconvCharsets {
    async fn list(&self) -> Result<Vec<String>, CharsetError> {
        let run = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.limit, run).await {
            Ok(result) => result?,
            Err(_) => return Err(CharsetError::Timeout(self.limit)),
        };
        if !output.status.success() {
            return Err(CharsetError::Failed {
                code: output.status.code(),
            });
        }
        let names = parse_charset_list(&String::from_utf8_lossy(&output.stdout));
        debug!(program = %self.program, count = names.len(), "listed charsets");
        Ok(names)
    }
}

/// Extracts charset names from `iconv -l` output.
///
/// Both the one-per-line form (`UTF-8//`) and the comma-separated alias
/// form (`UTF-8, UTF8,`) are accepted.  Trailing `/` markers are dropped,
/// duplicates are removed keeping the first occurrence.
pub fn parse_charset_list(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let neutral = text.replace(',', " ");
    neutral
        .split_whitespace()
        .map(|word| word.trim_end_matches('/'))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_owned)
        .collect()
}

/// Choices for the default charset field.
///
/// The first entry is always `""`, meaning "use the locale's charset".  The
/// listed names follow; on failure only the empty entry is offered.
pub async fn charset_choices(lister: &dyn CharsetLister) -> Vec<String> {
    let mut choices = vec![String::new()];
    match lister.list().await {
        Ok(names) => choices.extend(names.into_iter().filter(|n| !n.is_empty())),
        Err(e) => warn!("can't get list of charsets, offering only the default: {e}"),
    }
    choices
}
