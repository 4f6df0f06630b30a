//! Row-wise concatenation of two tables with partially overlapping columns.

use std::collections::HashSet;

use itertools::Itertools;
use log::debug;

use crate::{data::Cell, error::Result, table::Table};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineOptions {
    /// Drop rows identical to an earlier row, keeping the first occurrence.
    pub drop_duplicates: bool,
    /// Columns to lead the output, in this order. Names missing from the data
    /// are skipped.
    pub priority_columns: Option<Vec<String>>,
    /// Sort columns alphabetically. Ignored when `priority_columns` is set.
    pub sort_columns: bool,
}

impl CombineOptions {
    pub fn with_priority<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            priority_columns: Some(columns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

/// Columns of `first` followed by the columns only `second` has, each in
/// their original order.
pub fn union_columns(first: &Table, second: &Table) -> Vec<String> {
    first
        .columns()
        .iter()
        .chain(second.columns())
        .unique()
        .cloned()
        .collect()
}

pub fn order_columns(union: &[String], options: &CombineOptions) -> Vec<String> {
    if let Some(priority) = &options.priority_columns {
        let present = union.iter().collect::<HashSet<_>>();
        let leading = priority
            .iter()
            .filter(|name| present.contains(name))
            .unique()
            .cloned()
            .collect::<Vec<_>>();
        let skipped = priority
            .iter()
            .filter(|name| !present.contains(name))
            .collect::<Vec<_>>();
        if !skipped.is_empty() {
            debug!("Priority column(s) not present in data: {skipped:?}");
        }
        let lead = leading.iter().collect::<HashSet<_>>();
        let trailing = union.iter().filter(|name| !lead.contains(name)).cloned();
        leading.iter().cloned().chain(trailing).collect()
    } else if options.sort_columns {
        union.iter().sorted().cloned().collect()
    } else {
        union.to_vec()
    }
}

/// Stacks `second` under `first`.
///
/// The result holds every column of either input; cells for columns a source
/// table lacks are missing. Row order is `first` then `second`, preserved
/// within each source, before optional de-duplication and column ordering.
pub fn combine(first: &Table, second: &Table, options: &CombineOptions) -> Result<Table> {
    let union = union_columns(first, second);
    let mut rows = Vec::with_capacity(first.row_count() + second.row_count());
    for source in [first, second] {
        let positions = union
            .iter()
            .map(|name| source.column_index(name))
            .collect::<Vec<_>>();
        rows.extend(source.rows().iter().map(|row| align_row(row, &positions)));
    }

    if options.drop_duplicates {
        let before = rows.len();
        rows = rows.into_iter().unique().collect();
        debug!("Dropped {} duplicate row(s)", before - rows.len());
    }

    let combined = Table::new(union, rows)?;
    let order = order_columns(combined.columns(), options);
    if order == combined.columns() {
        Ok(combined)
    } else {
        combined.select(&order)
    }
}

fn align_row(row: &[Cell], positions: &[Option<usize>]) -> Vec<Cell> {
    positions
        .iter()
        .map(|position| position.and_then(|idx| row[idx].clone()))
        .collect()
}
