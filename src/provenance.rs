//! Backfill of the provenance column.
//!
//! Only rule-based output carries `MATCH_TYPE`; rows from the text-based
//! source arrive without it and are marked `TB`.

use crate::{data::Value, table::Table};

pub const MATCH_TYPE_COLUMN: &str = "MATCH_TYPE";
pub const TEXT_BASED_SENTINEL: &str = "TB";

pub fn fill_provenance(mut table: Table, column: &str, sentinel: &str) -> Table {
    fill_provenance_in_place(&mut table, column, sentinel);
    table
}

/// Returns how many cells were filled, or `None` if `column` is absent.
pub fn fill_provenance_in_place(table: &mut Table, column: &str, sentinel: &str) -> Option<usize> {
    table.fill_nulls(column, &Value::from(sentinel))
}
