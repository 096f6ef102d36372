//! Plus/minus set difference for diff-encoded list settings.
//!
//! A diff-encoded setting (for example the list of skipped file names) is not
//! stored as a full copy of the edited list.  Instead two keys are written:
//! `name+` holds the entries the user added relative to the base list, and
//! `name-` holds the entries the user removed.
//!
//! ```text
//! base B0 = {a, b, c}      edited N = {b, d}
//! plus    = N \ B0 = {d}   minus    = B0 \ N = {a, c}
//! (B0 ∪ plus) \ minus == N
//! ```
//!
//! Because only the difference is stored, a later change of the base (new
//! default entries shipped by the system configuration) is merged instead of
//! being masked: replaying the same delta against `B1 = {b, c, e}` yields
//! `{b, d, e}`.

use std::collections::BTreeSet;

/// Additions and removals relative to a base list.
///
/// Computed deltas are always disjoint.  Deltas read back from a
/// hand-edited file may overlap; [`apply_delta`] lets removals win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlusMinus {
    /// Entries added to the base.
    pub plus: BTreeSet<String>,
    /// Entries removed from the base.
    pub minus: BTreeSet<String>,
}

impl PlusMinus {
    /// Builds a delta from the stored textual values of `name+` and `name-`.
    ///
    /// An absent key is an empty set.
    pub fn from_stored(plus: Option<&str>, minus: Option<&str>) -> Self {
        Self {
            plus: plus.map(split_words).unwrap_or_default().into_iter().collect(),
            minus: minus.map(split_words).unwrap_or_default().into_iter().collect(),
        }
    }

    /// Textual form of the additions, suitable for storing under `name+`.
    pub fn plus_text(&self) -> String {
        join_words(&self.plus)
    }

    /// Textual form of the removals, suitable for storing under `name-`.
    pub fn minus_text(&self) -> String {
        join_words(&self.minus)
    }

    /// Returns `true` if the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.plus.is_empty() && self.minus.is_empty()
    }
}

/// Computes `plus = new \ base` and `minus = base \ new`.
///
/// Order and duplicates in either input are irrelevant; comparison is by
/// value and case-sensitive.
pub fn compute_delta<B, N, S, T>(base: B, new: N) -> PlusMinus
where
    B: IntoIterator<Item = S>,
    S: AsRef<str>,
    N: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let base: BTreeSet<String> = base.into_iter().map(|s| s.as_ref().to_owned()).collect();
    let new: BTreeSet<String> = new.into_iter().map(|s| s.as_ref().to_owned()).collect();
    PlusMinus {
        plus: new.difference(&base).cloned().collect(),
        minus: base.difference(&new).cloned().collect(),
    }
}

/// Replays `delta` against `base`, returning `(base ∪ plus) \ minus`.
///
/// Base order is preserved (first occurrence wins), additions not already in
/// the base are appended in sorted order.
pub fn apply_delta<B, S>(base: B, delta: &PlusMinus) -> Vec<String>
where
    B: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut merged = Vec::new();
    let additions = delta.plus.iter().map(String::as_str);
    for item in base.into_iter().map(|s| s.as_ref().to_owned()) {
        if !delta.minus.contains(&item) && seen.insert(item.clone()) {
            merged.push(item);
        }
    }
    for item in additions {
        if !delta.minus.contains(item) && seen.insert(item.to_owned()) {
            merged.push(item.to_owned());
        }
    }
    merged
}

/// Splits a list value into words.
///
/// Words are separated by whitespace.  Double quotes group characters
/// (including whitespace) into one word; inside quotes a backslash escapes
/// the next character.  An unterminated quote extends to the end of the text.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => in_quotes = false,
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                _ => current.push(c),
            }
        } else if c == '"' {
            in_quotes = true;
            in_word = true;
        } else if c.is_whitespace() {
            if in_word {
                words.push(std::mem::take(&mut current));
                in_word = false;
            }
        } else {
            current.push(c);
            in_word = true;
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// Joins words into a list value that [`split_words`] reads back unchanged.
pub fn join_words<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for word in words {
        let word = word.as_ref();
        if !out.is_empty() {
            out.push(' ');
        }
        if word.is_empty() || word.contains(|c: char| c.is_whitespace() || c == '"') {
            out.push('"');
            for c in word.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(word);
        }
    }
    out
}
