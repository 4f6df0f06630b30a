pub mod cli;
pub mod combine;
pub mod data;
pub mod error;
pub mod headers;
pub mod io_utils;
pub mod merge;
pub mod preview;
pub mod provenance;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::Cli;

pub use crate::{
    combine::{CombineOptions, combine},
    error::MergeError,
    headers::{HeaderNormalizer, RenameMap},
    merge::{MergeOutcome, PipelineConfig, run_pipeline},
    provenance::fill_provenance,
    table::Table,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("kpi_merge", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Arguments: {:?}", cli.merge);
    merge::execute(&cli.merge)
}
