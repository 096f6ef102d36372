//! Static table of the indexer settings the editor exposes.
//!
//! Each [`FieldSpec`] names a configuration key and says how the editor
//! treats it:
//!
//! - **kind** – what a valid value looks like (boolean, bounded integer,
//!   word list, one of a set of choices, ...).
//! - **scope** – global-only settings are always read and written in the
//!   global section; subtree settings follow the selected scope.
//! - **encoding** – direct settings are stored verbatim; diff-encoded ones
//!   are stored as `name+` / `name-` deltas against a computed base list.
//!
//! Labels are produced by [`field_labels`], a pure function called once per
//! session, so there is no shared mutable label table.

use std::collections::BTreeMap;

/// Read-only data provider used to offer choices for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceSource {
    /// Mime types known to the index engine.
    MimeTypes,
    /// Stemming languages supported by the index engine.
    StemmerNames,
    /// Character sets reported by the system (`iconv -l`).
    Charsets,
}

/// Shape of a field's textual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int { min: i64, max: i64 },
    Str,
    /// Whitespace-separated words (patterns, suffixes).
    StrList,
    /// Whitespace-separated directory paths.
    DirList,
    /// A single path.
    FileName { dir_only: bool },
    /// One value out of a provider's list.
    Choice(ChoiceSource),
    /// Several values out of a provider's list.
    ChoiceList(ChoiceSource),
}

/// Where a field may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    GlobalOnly,
    Subtree,
}

/// How a field's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Direct,
    DiffEncoded,
}

/// Description of one editable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub kind: FieldKind,
    pub scope: FieldScope,
    pub encoding: Encoding,
}

impl FieldSpec {
    const fn global(
        name: &'static str,
        label: &'static str,
        help: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            label,
            help,
            kind,
            scope: FieldScope::GlobalOnly,
            encoding: Encoding::Direct,
        }
    }

    const fn subtree(
        name: &'static str,
        label: &'static str,
        help: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            label,
            help,
            kind,
            scope: FieldScope::Subtree,
            encoding: Encoding::Direct,
        }
    }

    const fn diff_encoded(name: &'static str, label: &'static str, help: &'static str) -> Self {
        Self {
            name,
            label,
            help,
            kind: FieldKind::StrList,
            scope: FieldScope::Subtree,
            encoding: Encoding::DiffEncoded,
        }
    }

    /// Checks `text` against the field kind.
    ///
    /// Empty text is accepted for every kind except integers and booleans.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason.
    pub fn validate(&self, text: &str) -> Result<(), String> {
        let text = text.trim();
        match self.kind {
            FieldKind::Bool => parse_bool(text).map(|_| ()).ok_or_else(|| {
                format!("expected a boolean (0/1, true/false, yes/no, on/off), got {text:?}")
            }),
            FieldKind::Int { min, max } => {
                let value: i64 = text
                    .parse()
                    .map_err(|_| format!("expected an integer, got {text:?}"))?;
                if (min..=max).contains(&value) {
                    Ok(())
                } else {
                    Err(format!("{value} is outside the range {min}..={max}"))
                }
            }
            FieldKind::FileName { .. } | FieldKind::Choice(_)
                if text.contains(char::is_whitespace) && !text.starts_with('"') =>
            {
                // Paths and choices are single values; quoted paths may hold spaces.
                Err(format!("expected a single value, got {text:?}"))
            }
            _ => Ok(()),
        }
    }
}

/// Every field the editor knows, in display order.
pub static FIELDS: &[FieldSpec] = &[
    // ── Global parameters ─────────────────────────────────────────────────────
    FieldSpec::global(
        "topdirs",
        "Top directories",
        "The list of directories where recursive indexing starts. Default: your home.",
        FieldKind::DirList,
    ),
    FieldSpec::global(
        "skippedPaths",
        "Skipped paths",
        "Pathnames of directories which indexing will not enter. Path elements may contain wildcards.",
        FieldKind::DirList,
    ),
    FieldSpec::global(
        "indexstemminglanguages",
        "Stemming languages",
        "The languages for which stemming expansion dictionaries will be built.",
        FieldKind::ChoiceList(ChoiceSource::StemmerNames),
    ),
    FieldSpec::global(
        "logfilename",
        "Log file name",
        "The file where the messages will be written. Use 'stderr' for terminal output.",
        FieldKind::FileName { dir_only: false },
    ),
    FieldSpec::global(
        "loglevel",
        "Log verbosity level",
        "Amount of messages, from only errors to a lot of debugging data.",
        FieldKind::Int { min: 0, max: 6 },
    ),
    FieldSpec::global(
        "idxflushmb",
        "Index flush megabytes interval",
        "Amount of data indexed between flushes to disk. Default 10MB.",
        FieldKind::Int { min: 0, max: 1000 },
    ),
    FieldSpec::global(
        "maxfsoccuppc",
        "Max disk occupation (%, 0 means no limit)",
        "Percentage of total disk usage at which indexing will fail and stop.",
        FieldKind::Int { min: 0, max: 100 },
    ),
    FieldSpec::global(
        "noaspell",
        "No aspell usage",
        "Disables use of aspell to generate spelling approximation in the term explorer.",
        FieldKind::Bool,
    ),
    FieldSpec::global(
        "aspellLanguage",
        "Aspell language",
        "The language for the aspell dictionary, like 'en' or 'fr'. Unset means use the NLS environment.",
        FieldKind::Str,
    ),
    FieldSpec::global(
        "dbdir",
        "Database directory name",
        "Directory where the index is stored. Relative paths are taken from the configuration directory.",
        FieldKind::FileName { dir_only: true },
    ),
    FieldSpec::global(
        "unac_except_trans",
        "Unac exceptions",
        "Exceptions to diacritics removal. In each entry the first character is the source, the rest its translation.",
        FieldKind::Str,
    ),
    // ── Local (per subtree) parameters ────────────────────────────────────────
    FieldSpec::diff_encoded(
        "skippedNames",
        "Skipped names",
        "Patterns for file or directory names which should not be indexed.",
    ),
    FieldSpec::subtree(
        "indexedmimetypes",
        "Only mime types",
        "An exclusive list of indexed mime types. Nothing else will be indexed.",
        FieldKind::ChoiceList(ChoiceSource::MimeTypes),
    ),
    FieldSpec::subtree(
        "excludedmimetypes",
        "Exclude mime types",
        "Mime types not to be indexed.",
        FieldKind::ChoiceList(ChoiceSource::MimeTypes),
    ),
    FieldSpec::diff_encoded(
        "noContentSuffixes",
        "Ignored endings",
        "File name endings for files which will be indexed by name only.",
    ),
    FieldSpec::subtree(
        "defaultcharset",
        "Default character set",
        "Character set used for files which do not identify it internally. Empty means use the NLS environment.",
        FieldKind::Choice(ChoiceSource::Charsets),
    ),
    FieldSpec::subtree(
        "followLinks",
        "Follow symbolic links",
        "Follow symbolic links while indexing. The default is no, to avoid duplicate indexing.",
        FieldKind::Bool,
    ),
    FieldSpec::subtree(
        "indexallfilenames",
        "Index all file names",
        "Index the names of files whose contents cannot be identified or processed. Default true.",
        FieldKind::Bool,
    ),
    FieldSpec::subtree(
        "compressedfilemaxkbs",
        "Max. compressed file size (KB)",
        "Compressed files beyond this size are not processed. -1 for no limit, 0 for no decompression.",
        FieldKind::Int { min: -1, max: 1_000_000 },
    ),
    FieldSpec::subtree(
        "textfilemaxmbs",
        "Max. text file size (MB)",
        "Text files beyond this size are not processed. -1 for no limit.",
        FieldKind::Int { min: -1, max: 1_000_000 },
    ),
    FieldSpec::subtree(
        "textfilepagekbs",
        "Text file page size (KB)",
        "If not -1, text files are split in chunks of this size for indexing.",
        FieldKind::Int { min: -1, max: 1_000_000 },
    ),
    FieldSpec::subtree(
        "filtermaxseconds",
        "Max. filter exec. time (S)",
        "External filters working longer than this are aborted. -1 for no limit.",
        FieldKind::Int { min: -1, max: 10_000 },
    ),
];

/// Stemming languages supported by the index engine.
pub const STEMMER_NAMES: &[&str] = &[
    "danish", "dutch", "english", "finnish", "french", "german", "hungarian", "italian",
    "norwegian", "portuguese", "romanian", "russian", "spanish", "swedish", "turkish",
];

/// Looks up a field by configuration key.
pub fn find_field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Builds a fresh `field → label` map.
///
/// Known fields get their table label.  `extra` names (keys found in a
/// configuration that the table does not describe) are labelled with their
/// own name.
pub fn field_labels<I, S>(extra: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut labels: BTreeMap<String, String> = FIELDS
        .iter()
        .map(|f| (f.name.to_string(), f.label.to_string()))
        .collect();
    for name in extra {
        let name = name.into();
        labels.entry(name.clone()).or_insert(name);
    }
    labels
}

/// Parses the boolean spellings accepted in configuration files.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
