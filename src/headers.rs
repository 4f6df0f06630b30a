//! Header standardization.
//!
//! Text-based extraction output names its columns differently from the
//! rule-based output. Normalizing uppercases every header and then translates
//! the text-based names into their rule-based equivalents through a
//! [`RenameMap`]. Cells are never touched.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::{
    error::{MergeError, Result},
    table::Table,
};

/// Source-to-target column renames, keyed by the uppercased source name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    entries: BTreeMap<String, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates text-based column names into the rule-based vocabulary.
    pub fn tb_to_rb() -> Self {
        [
            ("PDF_NAME", "SRC_FILE"),
            ("PREDICTED_ANSWER", "VALUE"),
            ("PAGE", "PAGE_NUM"),
        ]
        .into_iter()
        .collect()
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(source.into(), target.into());
    }

    pub fn target(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(source, target)| (source.into(), target.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNormalizer {
    rename_map: RenameMap,
}

impl Default for HeaderNormalizer {
    fn default() -> Self {
        Self::new(RenameMap::tb_to_rb())
    }
}

impl HeaderNormalizer {
    pub fn new(rename_map: RenameMap) -> Self {
        Self { rename_map }
    }

    pub fn rename_map(&self) -> &RenameMap {
        &self.rename_map
    }

    pub fn normalize_name(&self, name: &str) -> String {
        let upper = name.to_uppercase();
        match self.rename_map.target(&upper) {
            Some(target) => target.to_string(),
            None => upper,
        }
    }

    /// Uppercases and renames every column of `table`.
    ///
    /// Fails with [`MergeError::SchemaCollision`] when two source headers end
    /// up with the same name, e.g. `page` and `PAGE`, or `PAGE` next to an
    /// existing `PAGE_NUM`.
    pub fn normalize(&self, table: Table) -> Result<Table> {
        let renamed = table
            .columns()
            .iter()
            .map(|name| self.normalize_name(name))
            .collect::<Vec<_>>();

        let mut sources: HashMap<&str, Vec<&str>> = HashMap::new();
        for (original, target) in table.columns().iter().zip(&renamed) {
            sources
                .entry(target.as_str())
                .or_default()
                .push(original.as_str());
        }
        if let Some((column, origins)) = renamed.iter().find_map(|name| {
            sources
                .get_key_value(name.as_str())
                .filter(|(_, origins)| origins.len() > 1)
        }) {
            return Err(MergeError::SchemaCollision {
                column: column.to_string(),
                sources: origins.iter().map(|s| s.to_string()).collect(),
            });
        }

        for (original, target) in table.columns().iter().zip(&renamed) {
            if original != target {
                debug!("Renamed column '{original}' -> '{target}'");
            }
        }
        table.with_columns(renamed)
    }
}
