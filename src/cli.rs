use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_OUTPUT: &str = "combined_output.csv";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Merge rule-based and text-based KPI extraction outputs into one CSV",
    long_about = "Load two files (CSV or XLSX), standardize their headers, combine them \
                  with the columns KPI_ID, SRC_FILE, VALUE, SCORE, PAGE_NUM, MATCH_TYPE \
                  leading, fill missing MATCH_TYPE values with \"TB\", and save the result \
                  as CSV.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub merge: MergeArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct MergeArgs {
    /// First file (CSV or XLSX) to combine
    #[arg(value_name = "FILE1")]
    pub first: PathBuf,
    /// Second file (CSV or XLSX) to combine
    #[arg(value_name = "FILE2")]
    pub second: PathBuf,
    /// Destination CSV file ('-' writes to stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    /// Remove rows that exactly repeat an earlier row. CSV cells compare as
    /// text, so a CSV `0.9` never matches a numeric 0.9 from a spreadsheet
    #[arg(long = "drop-duplicates")]
    pub drop_duplicates: bool,
    /// CSV delimiter character for reading input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of CSV inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Print the first N combined rows as a table after saving
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
