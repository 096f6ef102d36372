//! confoverlay: command-line editor for layered index configuration.
//!
//! Each invocation opens an editing session on the editable configuration
//! file, runs one command against it, and (for mutating commands) commits.
//!
//! # Usage
//!
//! ```text
//! confoverlay [OPTIONS] <COMMAND>
//!
//! Commands:
//!   fields                         Describe every known setting
//!   scopes [--all]                 List the global scope and customised subtrees
//!   show [--scope S]               Show every setting at a scope
//!   get FIELD [--scope S]          Print one setting
//!   set FIELD VALUE [--scope S]    Change one setting and save
//!   create-scope S                 Register a subtree and save
//!   erase-scope S                  Remove a subtree's settings and save
//!   charsets                       List character sets known to the system
//!   init-config                    Write the effective editor settings to editor.toml
//!
//! Options:
//!   --config-dir <DIR>      Directory of the editable file [env: CONFOVERLAY_CONFIG_DIR]
//!   --system-config <FILE>  Read-only system layer [env: CONFOVERLAY_SYSTEM_CONFIG]
//!   --json                  Print the command result as JSON
//! ```
//!
//! Options override the editor's own `editor.toml` settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use confoverlay_core::{shared, ConfigStore};
use confoverlay_editor::application::fields::STEMMER_NAMES;
use confoverlay_editor::application::session::{ChoiceLists, EditSession};
use confoverlay_editor::infrastructure::charsets::{charset_choices, IconvCharsets};
use confoverlay_editor::infrastructure::storage::config::{
    config_file_path, load_config, save_config_to, EditorConfig,
};
use confoverlay_editor::infrastructure::storage::file_backend::{load_document, FileBackend};
use confoverlay_editor::infrastructure::ui_bridge::{self, scope_label, CommandResult};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Layered index configuration editor.
#[derive(Debug, Parser)]
#[command(
    name = "confoverlay",
    about = "Edit global and per-subtree index settings",
    version
)]
struct Cli {
    /// Directory holding the editable configuration file.
    #[arg(long, global = true, env = "CONFOVERLAY_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Read-only system configuration layered below the editable file.
    #[arg(long, global = true, env = "CONFOVERLAY_SYSTEM_CONFIG")]
    system_config: Option<PathBuf>,

    /// Print results as JSON `{ success, data, error }` objects.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Describe every known setting.
    Fields,
    /// List the global scope and customised subtrees.
    Scopes {
        /// Include subtrees defined only by the system configuration.
        #[arg(long)]
        all: bool,
    },
    /// Show every setting editable at a scope.
    Show {
        #[arg(long, default_value = "")]
        scope: String,
    },
    /// Print one setting.
    Get {
        field: String,
        #[arg(long, default_value = "")]
        scope: String,
    },
    /// Change one setting and save.
    Set {
        field: String,
        value: String,
        #[arg(long, default_value = "")]
        scope: String,
    },
    /// Register a subtree and save.
    CreateScope { scope: String },
    /// Remove every setting of a subtree and save.
    EraseScope { scope: String },
    /// List the character sets known to the system.
    Charsets,
    /// Write the effective editor settings (with overrides) to `editor.toml`.
    InitConfig,
}

impl Cli {
    /// Applies command-line overrides to the editor settings.
    fn apply_to(&self, config: &mut EditorConfig) {
        if let Some(dir) = &self.config_dir {
            config.paths.config_dir = Some(dir.clone());
        }
        if let Some(system) = &self.system_config {
            config.paths.system_config = Some(system.clone());
        }
    }
}

// ── Session wiring ────────────────────────────────────────────────────────────

/// Opens the main store (editable file plus optional system layer) and a
/// session on it.
fn open_session(config: &EditorConfig, charsets: Vec<String>) -> anyhow::Result<EditSession> {
    let path = config
        .editable_file()
        .context("cannot locate the editable configuration file")?;
    let backend = Arc::new(FileBackend::new(&path));
    let mut store = ConfigStore::open(backend)
        .with_context(|| format!("failed to open configuration {}", path.display()))?;

    if let Some(system) = &config.paths.system_config {
        let layer = load_document(system)
            .with_context(|| format!("failed to read system configuration {}", system.display()))?;
        store = store.with_lower_layer(layer);
    }

    let choices = ChoiceLists {
        mime_types: Vec::new(),
        stemmers: STEMMER_NAMES.iter().map(|s| s.to_string()).collect(),
        charsets,
    };
    EditSession::open(shared(store), choices).context("failed to start editing session")
}

/// Prints `result` and turns a failed command into an error.
fn emit<T: Serialize>(
    result: CommandResult<T>,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to encode result")?
        );
    }
    match (result.data, result.error) {
        (Some(data), _) if result.success => {
            if !json {
                let text = render(&data);
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            Ok(())
        }
        (_, error) => Err(anyhow!(error.unwrap_or_else(|| "command failed".to_string()))),
    }
}

/// Fails with the command's error, or continues.
fn require<T: Serialize>(result: CommandResult<T>) -> anyhow::Result<()> {
    if result.success {
        Ok(())
    } else {
        Err(anyhow!(result.error.unwrap_or_else(|| "command failed".to_string())))
    }
}

fn commit(session: &mut EditSession, json: bool) -> anyhow::Result<()> {
    emit(ui_bridge::commit(session), json, |_| String::new())
        .context("failed to save configuration")
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => (EditorConfig::default(), Some(e)),
    };
    cli.apply_to(&mut config);

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.editor.log_level)),
        )
        .init();
    if let Some(e) = config_error {
        warn!("using default editor settings: {e}");
    }

    let json = cli.json;
    match cli.command {
        Command::Fields => emit(ui_bridge::describe_fields(), json, |fields| {
            fields
                .iter()
                .map(|f| {
                    let place = if f.global_only { "global" } else { "subtree" };
                    format!("{:<24} {:<12} {:<8} {}", f.name, f.kind, place, f.label)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }),

        Command::Scopes { all } => {
            let session = open_session(&config, Vec::new())?;
            emit(ui_bridge::list_scopes(&session, !all), json, |scopes| {
                scopes
                    .iter()
                    .map(|s| s.label.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }

        Command::Show { scope } => {
            let mut session = open_session(&config, Vec::new())?;
            require(ui_bridge::select_scope(&mut session, &scope))?;
            emit(ui_bridge::list_fields(&session), json, |fields| {
                fields
                    .iter()
                    .map(|f| {
                        let marker = if f.set_here { '*' } else { ' ' };
                        let value = f.value.as_deref().unwrap_or("(default)");
                        format!("{marker} {:<24} = {value}", f.name)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }

        Command::Get { field, scope } => {
            let mut session = open_session(&config, Vec::new())?;
            require(ui_bridge::select_scope(&mut session, &scope))?;
            emit(ui_bridge::get_value(&session, &field), json, |v| {
                v.value.clone().unwrap_or_default()
            })
        }

        Command::Set { field, value, scope } => {
            let mut session = open_session(&config, Vec::new())?;
            require(ui_bridge::select_scope(&mut session, &scope))?;
            require(ui_bridge::set_value(&mut session, &field, &value))?;
            info!(field = %field, scope = %scope_label(&session.selected()), "setting changed");
            commit(&mut session, json)
        }

        Command::CreateScope { scope } => {
            let mut session = open_session(&config, Vec::new())?;
            require(ui_bridge::create_scope(&mut session, &scope))?;
            commit(&mut session, json)
        }

        Command::EraseScope { scope } => {
            let mut session = open_session(&config, Vec::new())?;
            let erased = ui_bridge::erase_scope(&mut session, &scope);
            if erased.data == Some(false) {
                warn!(scope = %scope, "no settings stored for this subtree");
            }
            require(erased)?;
            commit(&mut session, json)
        }

        Command::Charsets => {
            let lister = IconvCharsets::new(
                &config.editor.charset_command,
                Duration::from_millis(config.editor.charset_timeout_ms),
            );
            let charsets = charset_choices(&lister).await;
            let session = open_session(&config, charsets)?;
            emit(
                ui_bridge::get_choices(&session, "defaultcharset"),
                json,
                |names| {
                    names
                        .iter()
                        .map(|n| if n.is_empty() { "(locale default)" } else { n.as_str() })
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )
        }

        Command::InitConfig => {
            let path = config_file_path().context("cannot locate the editor settings file")?;
            save_config_to(&config, &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "editor settings written");
            emit(CommandResult::ok(path.display().to_string()), json, |p| p.clone())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_set_with_scope() {
        // Arrange / Act
        let cli = Cli::parse_from([
            "confoverlay",
            "set",
            "followLinks",
            "1",
            "--scope",
            "/home/me/src",
        ]);

        // Assert
        match cli.command {
            Command::Set { field, value, scope } => {
                assert_eq!(field, "followLinks");
                assert_eq!(value, "1");
                assert_eq!(scope, "/home/me/src");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_scope_defaults_to_global() {
        let cli = Cli::parse_from(["confoverlay", "get", "loglevel"]);
        assert!(matches!(cli.command, Command::Get { scope, .. } if scope.is_empty()));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["confoverlay", "scopes", "--all", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Scopes { all: true }));
    }

    #[test]
    fn test_cli_overrides_editor_config_paths() {
        // Arrange
        let cli = Cli::parse_from([
            "confoverlay",
            "--config-dir",
            "/srv/index",
            "--system-config",
            "/usr/share/index/base.conf",
            "fields",
        ]);
        let mut config = EditorConfig::default();

        // Act
        cli.apply_to(&mut config);

        // Assert
        assert_eq!(config.paths.config_dir, Some(PathBuf::from("/srv/index")));
        assert_eq!(
            config.paths.system_config,
            Some(PathBuf::from("/usr/share/index/base.conf"))
        );
    }

    #[test]
    fn test_cli_parses_init_config() {
        let cli = Cli::parse_from(["confoverlay", "init-config", "--config-dir", "/srv/index"]);
        assert!(matches!(cli.command, Command::InitConfig));
        assert_eq!(cli.config_dir, Some(PathBuf::from("/srv/index")));
    }

    #[test]
    fn test_emit_reports_command_error() {
        let result: CommandResult<()> = CommandResult::err("invalid value for loglevel");
        let err = emit(result, false, |_| String::new()).unwrap_err();
        assert!(err.to_string().contains("loglevel"));
    }

    #[test]
    fn test_open_session_reads_system_layer() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("confoverlay_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let system = dir.join("system.conf");
        std::fs::write(&system, "loglevel = 3\n[~/.thunderbird]\nskippedNames+ = *.msf\n").unwrap();
        let mut config = EditorConfig::default();
        config.paths.config_dir = Some(dir.join("user"));
        config.paths.system_config = Some(system);

        // Act
        let session = open_session(&config, Vec::new()).unwrap();

        // Assert
        assert_eq!(session.get_value("loglevel").unwrap().as_deref(), Some("3"));
        assert_eq!(session.list_scopes(false), vec!["", "~/.thunderbird"]);
        assert_eq!(session.list_scopes(true), vec![""]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
