//! In-memory table with named columns.
//!
//! Rows are stored row-major as `Vec<Option<Value>>`, addressed by position
//! through a name-to-index lookup. Column names are unique within a table and
//! every row has exactly one cell per column.

use std::collections::HashMap;

use crate::{
    data::{Cell, Value},
    error::{MergeError, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let index = build_index(&columns)?;
        if let Some((row_idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(MergeError::malformed(
                "<table>",
                format!(
                    "row {} has {} cell(s) but the table has {} column(s)",
                    row_idx,
                    row.len(),
                    columns.len()
                ),
            ));
        }
        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn empty(columns: Vec<String>) -> Result<Self> {
        Self::new(columns, Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn column_values(&self, column: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Replaces the column names without touching any cell.
    pub fn with_columns(self, columns: Vec<String>) -> Result<Self> {
        if columns.len() != self.columns.len() {
            return Err(MergeError::malformed(
                "<table>",
                format!(
                    "expected {} column name(s), got {}",
                    self.columns.len(),
                    columns.len()
                ),
            ));
        }
        Self::new(columns, self.rows)
    }

    /// Reorders the table so its columns follow `order`.
    ///
    /// `order` must be a permutation of the current column names.
    pub fn select(self, order: &[String]) -> Result<Self> {
        let positions = order
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| {
                    MergeError::malformed("<table>", format!("unknown column '{name}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if positions.len() != self.columns.len() {
            return Err(MergeError::malformed(
                "<table>",
                "column order must name every column exactly once",
            ));
        }
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                positions
                    .iter()
                    .map(|&idx| row[idx].take())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self::new(order.to_vec(), rows)
    }

    /// Sets every missing cell in `column` to `value`.
    ///
    /// Returns the number of cells filled, or `None` when the column does not
    /// exist.
    pub fn fill_nulls(&mut self, column: &str, value: &Value) -> Option<usize> {
        let idx = self.column_index(column)?;
        let mut filled = 0usize;
        for row in &mut self.rows {
            if row[idx].is_none() {
                row[idx] = Some(value.clone());
                filled += 1;
            }
        }
        Some(filled)
    }
}

fn build_index(columns: &[String]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        if index.insert(name.clone(), idx).is_some() {
            return Err(MergeError::SchemaCollision {
                column: name.clone(),
                sources: vec![name.clone(), name.clone()],
            });
        }
    }
    Ok(index)
}
