//! The merge pipeline: load both inputs, standardize headers, combine,
//! backfill provenance, write.
//!
//! [`run_pipeline`] is the in-memory core and performs no I/O. [`execute`]
//! wraps it with loading, writing and console reporting for the command line.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    cli::MergeArgs,
    combine::{CombineOptions, combine},
    error::MergeError,
    headers::HeaderNormalizer,
    io_utils::{self, ReadOptions},
    preview,
    provenance::{MATCH_TYPE_COLUMN, TEXT_BASED_SENTINEL, fill_provenance_in_place},
    table::Table,
};

/// Canonical leading column order of the merged output.
pub const PRIORITY_COLUMNS: &[&str] = &[
    "KPI_ID",
    "SRC_FILE",
    "VALUE",
    "SCORE",
    "PAGE_NUM",
    "MATCH_TYPE",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub normalizer: HeaderNormalizer,
    pub combine: CombineOptions,
    pub provenance_column: String,
    pub sentinel: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalizer: HeaderNormalizer::default(),
            combine: CombineOptions::with_priority(PRIORITY_COLUMNS.iter().copied()),
            provenance_column: MATCH_TYPE_COLUMN.to_string(),
            sentinel: TEXT_BASED_SENTINEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: Table,
    /// Cells backfilled in the provenance column; `None` if the column is absent.
    pub filled_provenance: Option<usize>,
}

pub fn run_pipeline(
    first: Table,
    second: Table,
    config: &PipelineConfig,
) -> std::result::Result<MergeOutcome, MergeError> {
    info!("Standardizing headers...");
    debug!(
        "Applying {} rename rule(s)",
        config.normalizer.rename_map().len()
    );
    let first = config.normalizer.normalize(first)?;
    let second = config.normalizer.normalize(second)?;

    info!("Combining tables...");
    let mut table = combine(&first, &second, &config.combine)?;

    let filled_provenance =
        fill_provenance_in_place(&mut table, &config.provenance_column, &config.sentinel);
    if let Some(count) = filled_provenance {
        info!(
            "Filled {count} null {} value(s) with '{}'",
            config.provenance_column, config.sentinel
        );
    }
    Ok(MergeOutcome {
        table,
        filled_provenance,
    })
}

pub fn execute(args: &MergeArgs) -> Result<()> {
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let read_options = ReadOptions {
        delimiter: args.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER),
        encoding: input_encoding,
    };
    let output_delimiter = args.output_delimiter.unwrap_or(read_options.delimiter);

    let first = load("1", &args.first, &read_options)?;
    let second = load("2", &args.second, &read_options)?;

    let mut config = PipelineConfig::default();
    config.combine.drop_duplicates = args.drop_duplicates;
    let outcome = run_pipeline(first, second, &config).context("Merging inputs")?;
    let table = outcome.table;

    io_utils::write_table(&table, &args.output, output_delimiter)
        .with_context(|| format!("Writing combined output to {:?}", args.output))?;

    if io_utils::is_dash(&args.output) {
        info!(
            "Wrote {} row(s) x {} column(s) to stdout",
            table.row_count(),
            table.column_count()
        );
        if args.preview.is_some() {
            warn!("Preview skipped: the combined CSV is being written to stdout");
        }
        return Ok(());
    }
    println!("✓ Combined data saved to: {}", args.output.display());
    println!("Total rows: {}", table.row_count());
    println!("Total columns: {}", table.column_count());
    if let Some(rows) = args.preview {
        print!("{}", preview::render_table(&table, rows));
    }
    Ok(())
}

fn load(label: &str, path: &Path, options: &ReadOptions) -> Result<Table> {
    info!("Loading file {label}: {}", path.display());
    io_utils::load_table(path, options).with_context(|| format!("Loading file {label}"))
}
