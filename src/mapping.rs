/*!
 * Word mapping used for find/replace translation.
 *
 * A mapping file holds one `source=target` pair per line. Lines are stripped,
 * split on the first `=` only, and both sides are kept verbatim. Blank lines,
 * `#` comments and lines without a separator are ignored.
 */

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Ordered source → target substitution table.
///
/// Re-inserting an existing source replaces its target but keeps the
/// position of the first occurrence, so application order is the order in
/// which sources were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: IndexMap<String, String>,
}

impl Mapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse mapping text.
    pub fn parse(content: &str) -> Self {
        let mut mapping = Self::new();

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((source, target)) = line.split_once('=') else {
                debug!("Skipping mapping line {} without separator", line_no + 1);
                continue;
            };

            if source.is_empty() {
                debug!("Skipping mapping line {} with empty source", line_no + 1);
                continue;
            }

            mapping.insert(source, target);
        }

        mapping
    }

    /// Load a mapping file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::ResourceNotFound(path.to_path_buf()).into());
        }

        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to read mapping file: {:?}", path))?;

        Ok(Self::parse(&content))
    }

    /// Insert or overwrite an entry
    pub fn insert(&mut self, source: &str, target: &str) {
        self.entries.insert(source.to_string(), target.to_string());
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in application order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Whether any source occurs in `text`
    pub fn contains_any_source(&self, text: &str) -> bool {
        self.entries.keys().any(|source| text.contains(source.as_str()))
    }

    /// Apply every entry to the whole string, in mapping order.
    ///
    /// Each replacement sees the output of the previous one, so an earlier
    /// short source can consume text a later, longer source would have matched.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (source, target) in &self.entries {
            if result.contains(source.as_str()) {
                result = result.replace(source.as_str(), target);
            }
        }
        result
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (source, target) in iter {
            mapping.insert(source, target);
        }
        mapping
    }
}
