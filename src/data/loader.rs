use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use reqwest::Url;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, LaunchRecord, OutcomeClass};

// ---------------------------------------------------------------------------
// Required columns
// ---------------------------------------------------------------------------

pub const COL_LAUNCH_SITE: &str = "Launch Site";
pub const COL_CLASS: &str = "class";
pub const COL_PAYLOAD_MASS: &str = "Payload Mass (kg)";
pub const COL_BOOSTER_CATEGORY: &str = "Booster Version Category";
pub const COL_BOOSTER_VERSION: &str = "Booster Version";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a launch table could not be loaded. Always fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}")]
    Io {
        path: String,
        #[source]
        err: std::io::Error,
    },
    #[error("cannot fetch {uri}")]
    Http {
        uri: String,
        #[source]
        err: reqwest::Error,
    },
    #[error("unsupported source format: .{0}")]
    UnsupportedFormat(String),
    #[error("source is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("malformed CSV")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),
    #[error("malformed Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("unreadable Arrow column")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("{0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Encoding of a launch table, chosen from the source's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    /// Pick the format from the extension of the path component of `source`.
    /// Sources without an extension are read as CSV. A purely numeric suffix
    /// (`/v1.2`) is a version segment, not an extension.
    pub fn detect(source: &str) -> Result<Self, LoadError> {
        let ext = if is_remote(source) {
            let url = Url::parse(source)
                .map_err(|e| LoadError::Malformed(format!("invalid URI {source}: {e}")))?;
            extension_of(Path::new(url.path()))
        } else {
            extension_of(Path::new(source))
        };

        match ext.as_deref() {
            None | Some("csv") => Ok(SourceFormat::Csv),
            Some("json") => Ok(SourceFormat::Json),
            Some("parquet") | Some("pq") => Ok(SourceFormat::Parquet),
            Some(other) => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_ascii_lowercase)
}

/// Whether `source` is fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Load the launch table from a URI or a local path. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the required column names (default)
/// * `.json`    – `[{ "Launch Site": "...", "class": 1, ... }, ...]`
/// * `.parquet` – one column per required field
///
/// Columns other than the five required ones are ignored.
pub fn load(source: &str) -> Result<Dataset, LoadError> {
    let format = SourceFormat::detect(source)?;

    if is_remote(source) {
        let body = fetch(source)?.bytes().map_err(|err| LoadError::Http {
            uri: source.to_string(),
            err,
        })?;
        return match format {
            SourceFormat::Csv => parse_csv(&body[..]),
            SourceFormat::Json => parse_json(&body),
            SourceFormat::Parquet => parse_parquet(body),
        };
    }

    let io = |err: std::io::Error| LoadError::Io {
        path: source.to_string(),
        err,
    };
    match format {
        SourceFormat::Csv => parse_csv(File::open(source).map_err(io)?),
        SourceFormat::Json => parse_json(&std::fs::read(source).map_err(io)?),
        SourceFormat::Parquet => parse_parquet(File::open(source).map_err(io)?),
    }
}

fn fetch(uri: &str) -> Result<reqwest::blocking::Response, LoadError> {
    log::info!("Fetching launch records from {uri}");
    let http = |err: reqwest::Error| LoadError::Http {
        uri: uri.to_string(),
        err,
    };
    reqwest::blocking::get(uri)
        .map_err(http)?
        .error_for_status()
        .map_err(http)
}

// ---------------------------------------------------------------------------
// Column lookup shared by the tabular formats
// ---------------------------------------------------------------------------

/// Positions of the required columns in a header row or Arrow schema.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    site: usize,
    class: usize,
    payload: usize,
    category: usize,
    version: usize,
}

impl ColumnIndex {
    fn locate(position: impl Fn(&str) -> Option<usize>) -> Result<Self, LoadError> {
        let find = |name: &'static str| position(name).ok_or(LoadError::MissingColumn(name));
        Ok(ColumnIndex {
            site: find(COL_LAUNCH_SITE)?,
            class: find(COL_CLASS)?,
            payload: find(COL_PAYLOAD_MASS)?,
            category: find(COL_BOOSTER_CATEGORY)?,
            version: find(COL_BOOSTER_VERSION)?,
        })
    }
}

fn invalid(row: usize, column: &'static str, value: impl ToString) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    }
}

fn parse_number(row: usize, column: &'static str, raw: &str) -> Result<f64, LoadError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| invalid(row, column, raw))
}

fn outcome(row: usize, value: f64) -> Result<OutcomeClass, LoadError> {
    OutcomeClass::from_value(value).ok_or_else(|| invalid(row, COL_CLASS, value))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one launch per row.
/// Header names are compared after trimming surrounding whitespace.
fn parse_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::locate(|name| headers.iter().position(|h| h.trim() == name))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        records.push(LaunchRecord {
            launch_site: cell(columns.site).to_string(),
            payload_mass_kg: parse_number(row, COL_PAYLOAD_MASS, cell(columns.payload))?,
            outcome: outcome(row, parse_number(row, COL_CLASS, cell(columns.class))?)?,
            booster_version: cell(columns.version).to_string(),
            booster_version_category: cell(columns.category).to_string(),
        });
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Launch Site": "CCAFS LC-40",
///     "class": 0,
///     "Payload Mass (kg)": 0.0,
///     "Booster Version": "F9 v1.0  B0003",
///     "Booster Version Category": "v1.0"
///   },
///   ...
/// ]
/// ```
fn parse_json(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected a top-level JSON array".to_string()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {row} is not a JSON object")))?;
        let field = |column: &'static str| obj.get(column).ok_or(LoadError::MissingColumn(column));

        records.push(LaunchRecord {
            launch_site: json_text(row, COL_LAUNCH_SITE, field(COL_LAUNCH_SITE)?)?,
            payload_mass_kg: json_number(row, COL_PAYLOAD_MASS, field(COL_PAYLOAD_MASS)?)?,
            outcome: outcome(row, json_number(row, COL_CLASS, field(COL_CLASS)?)?)?,
            booster_version: json_text(row, COL_BOOSTER_VERSION, field(COL_BOOSTER_VERSION)?)?,
            booster_version_category: json_text(
                row,
                COL_BOOSTER_CATEGORY,
                field(COL_BOOSTER_CATEGORY)?,
            )?,
        });
    }

    Ok(Dataset::from_records(records))
}

fn json_text(row: usize, column: &'static str, val: &JsonValue) -> Result<String, LoadError> {
    match val {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(invalid(row, column, other)),
    }
}

fn json_number(row: usize, column: &'static str, val: &JsonValue) -> Result<f64, LoadError> {
    match val {
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| invalid(row, column, n)),
        JsonValue::String(s) => parse_number(row, column, s),
        other => Err(invalid(row, column, other)),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per required field.
///
/// Numeric columns may be any integer or float type and text columns any
/// string type; everything is cast to `Float64` / `Utf8` before reading.
/// Works with files written by both Pandas and Polars.
fn parse_parquet<T: ChunkReader + 'static>(reader: T) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();
    let columns = ColumnIndex::locate(|name| schema.index_of(name).ok())?;
    let batches = builder.build()?;

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in batches {
        let batch = batch_result?;
        let sites = cast_column(&batch, columns.site, &DataType::Utf8)?;
        let classes = cast_column(&batch, columns.class, &DataType::Float64)?;
        let payloads = cast_column(&batch, columns.payload, &DataType::Float64)?;
        let categories = cast_column(&batch, columns.category, &DataType::Utf8)?;
        let versions = cast_column(&batch, columns.version, &DataType::Utf8)?;

        for i in 0..batch.num_rows() {
            let row = offset + i;
            records.push(LaunchRecord {
                launch_site: text_cell(&sites, row, i, COL_LAUNCH_SITE)?,
                payload_mass_kg: number_cell(&payloads, row, i, COL_PAYLOAD_MASS)?,
                outcome: outcome(row, number_cell(&classes, row, i, COL_CLASS)?)?,
                booster_version: text_cell(&versions, row, i, COL_BOOSTER_VERSION)?,
                booster_version_category: text_cell(&categories, row, i, COL_BOOSTER_CATEGORY)?,
            });
        }
        offset += batch.num_rows();
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn cast_column(batch: &RecordBatch, idx: usize, to: &DataType) -> Result<ArrayRef, LoadError> {
    Ok(cast(batch.column(idx), to)?)
}

/// Read one string cell from a column already cast to `Utf8`.
fn text_cell(col: &ArrayRef, row: usize, i: usize, column: &'static str) -> Result<String, LoadError> {
    let strings = col
        .as_string_opt::<i32>()
        .ok_or_else(|| LoadError::Malformed(format!("column '{column}' is not text")))?;
    if strings.is_null(i) {
        return Err(invalid(row, column, "null"));
    }
    Ok(strings.value(i).to_string())
}

/// Read one numeric cell from a column already cast to `Float64`.
fn number_cell(col: &ArrayRef, row: usize, i: usize, column: &'static str) -> Result<f64, LoadError> {
    let numbers = col
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| LoadError::Malformed(format!("column '{column}' is not numeric")))?;
    if numbers.is_null(i) {
        return Err(invalid(row, column, "null"));
    }
    Ok(numbers.value(i))
}
