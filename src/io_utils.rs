//! File I/O for the merge pipeline.
//!
//! Every table enters and leaves the program through this module:
//!
//! - **Format dispatch**: the file extension (case-insensitive) selects the
//!   reader. `.csv` goes through the `csv` crate, `.xlsx`/`.xls` through
//!   `calamine` (first worksheet only).
//! - **Headers**: the first row is the header. Blank header cells are named
//!   `Unnamed: <position>`. CSV rows shorter than the header are padded with
//!   missing cells; longer rows are malformed.
//! - **Nulls**: CSV fields matching [`NULL_TOKENS`](crate::data::NULL_TOKENS)
//!   and empty spreadsheet cells load as missing.
//! - **Encoding**: CSV input is decoded with `encoding_rs`, defaulting to UTF-8.
//! - **Output**: CSV with a header row, no index column, missing cells as
//!   empty fields. The `-` path writes to stdout.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::anyhow;
use calamine::{Data, Reader, open_workbook_auto};
use csv::{ByteRecord, QuoteStyle};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{Cell, Value, display_cell, is_null_token, parse_text_cell},
    error::{MergeError, Result},
    table::Table,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".csv", ".xlsx", ".xls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        match extension.as_str() {
            ".csv" => Ok(InputFormat::Csv),
            ".xlsx" | ".xls" => Ok(InputFormat::Spreadsheet),
            _ => Err(MergeError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> anyhow::Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Loads `path` into a [`Table`], picking the reader from the extension.
///
/// A missing file is reported before the extension is looked at.
pub fn load_table(path: &Path, options: &ReadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(MergeError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let table = match InputFormat::from_path(path)? {
        InputFormat::Csv => read_csv(path, options)?,
        InputFormat::Spreadsheet => read_spreadsheet(path)?,
    };
    debug!(
        "Loaded {} row(s) x {} column(s) from {:?}",
        table.row_count(),
        table.column_count(),
        path
    );
    Ok(table)
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

fn read_csv(path: &Path, options: &ReadOptions) -> Result<Table> {
    let file = File::open(path)?;
    let mut reader = open_csv_reader(BufReader::new(file), options.delimiter);
    let raw_headers = reader.byte_headers()?.clone();
    if raw_headers.is_empty() {
        return Err(MergeError::malformed(path, "no header row"));
    }
    let columns = name_columns(decode_record(&raw_headers, options.encoding, path)?);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            let line = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(row_idx as u64 + 2);
            return Err(MergeError::malformed(
                path,
                format!(
                    "line {line} has {} field(s) but the header has {}",
                    record.len(),
                    columns.len()
                ),
            ));
        }
        let decoded = decode_record(&record, options.encoding, path)?;
        let mut row: Vec<Cell> = decoded.iter().map(|field| parse_text_cell(field)).collect();
        // short rows are padded with missing cells
        row.resize(columns.len(), None);
        rows.push(row);
    }
    Table::new(columns, rows)
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MergeError::malformed(path, "workbook has no worksheets"))??;
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| MergeError::malformed(path, "no header row"))?;
    let columns = name_columns(header.iter().map(header_text).collect());
    let rows = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();
    Table::new(columns, rows)
}

fn decode_record(
    record: &ByteRecord,
    encoding: &'static Encoding,
    path: &Path,
) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(MergeError::malformed(
                    path,
                    format!("text is not valid {}", encoding.name()),
                ))
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}

fn name_columns(headers: Vec<String>) -> Vec<String> {
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect()
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => spreadsheet_cell(other)
            .as_ref()
            .map(Value::as_display)
            .unwrap_or_default(),
    }
}

fn spreadsheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if is_null_token(s) => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::Integer(*i)),
        Data::Float(f) if f.is_nan() => None,
        Data::Float(f) => Some(Value::Float(*f)),
        Data::Bool(b) => Some(Value::Boolean(*b)),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(Value::DateTime)
                .unwrap_or_else(|| Value::Float(dt.as_f64())),
        ),
        other => Some(Value::String(other.to_string())),
    }
}

pub fn open_csv_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = if is_dash(path) {
        Box::new(std::io::stdout())
    } else {
        Box::new(BufWriter::new(File::create(path)?))
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(base))
}

pub fn write_table(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let mut writer = open_csv_writer(path, delimiter)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(display_cell))?;
    }
    writer.flush()?;
    Ok(())
}
