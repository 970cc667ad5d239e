use std::io::Read;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    ChestPain, Dataset, Disease, NumericText, Record, Sex, AGE, CHEST_PAIN, CHOLESTEROL, DATE_EXAM,
    MAX_HEART_RATE, REQUIRED_COLUMNS, SEX, TARGET,
};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Whether the `date_exam` column feeds the temporal features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TemporalMode {
    /// Ignore `date_exam`; if present it is carried as a plain extra column.
    Off,
    /// Use `date_exam` when the column exists.
    #[default]
    Auto,
    /// A missing `date_exam` column is a load error.
    Required,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub temporal: TemporalMode,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a patient dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (the usual `heart.csv`)
/// * `.json`    – `[{ "age": 63, "sex": 1, ... }, ...]`
/// * `.parquet` – flat columns written by Pandas or Polars
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => {
            let file = open(path)?;
            read_csv(file, options)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_json(&text, options)?
        }
        "parquet" | "pq" => read_parquet(open(path)?, options)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} records from {} (temporal: {}, columns: {:?})",
        dataset.len(),
        path.display(),
        dataset.is_temporal(),
        dataset.columns()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one exam per line.
/// Columns beyond the required set are kept verbatim for export.
pub fn read_csv<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let builder = RowBuilder::new(&headers, options)?;
    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let cells: Vec<&str> = row.iter().collect();
        records.push(builder.build(row_no + 1, &cells)?);
    }

    builder.finish(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 63, "sex": 1, "cp": 3, "chol": 233, "thalach": 150, "target": 1 },
///   ...
/// ]
/// ```
///
/// Columns are taken from the keys of the first object; a later object with
/// a key outside that set is malformed.
pub fn read_json(text: &str, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".to_string()))?;

    let headers: Vec<String> = match rows.first() {
        Some(JsonValue::Object(obj)) => obj.keys().cloned().collect(),
        Some(_) => return Err(LoadError::Malformed("row 1 is not a JSON object".to_string())),
        None => return Err(LoadError::Empty),
    };

    let builder = RowBuilder::new(&headers, options)?;
    let mut records = Vec::with_capacity(rows.len());

    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {} is not a JSON object", i + 1)))?;
        if let Some(key) = obj.keys().find(|k| !headers.contains(k)) {
            return Err(LoadError::Malformed(format!(
                "row {} has key '{key}' not present in row 1",
                i + 1
            )));
        }
        let cells: Vec<String> = headers
            .iter()
            .map(|h| obj.get(h).map(json_to_cell).unwrap_or_default())
            .collect();
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        records.push(builder.build(i + 1, &cells)?);
    }

    builder.finish(records)
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Integer, float, string and `Date32` columns are accepted; every cell is
/// rendered through Arrow's display formatter and validated like CSV text.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
pub fn read_parquet(file: std::fs::File, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let rows = RowBuilder::new(&headers, options)?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        Ok(String::new())
                    } else {
                        array_value_to_string(col.as_ref(), row)
                    }
                })
                .collect::<Result<Vec<String>, _>>()?;
            let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
            records.push(rows.build(records.len() + 1, &cells)?);
        }
    }

    rows.finish(records)
}

// ---------------------------------------------------------------------------
// Row validation shared by every format
// ---------------------------------------------------------------------------

/// Column positions resolved once from the header.
struct RowBuilder {
    columns: Vec<String>,
    age: usize,
    sex: usize,
    cp: usize,
    chol: usize,
    thalach: usize,
    target: usize,
    date_exam: Option<usize>,
    extra: Vec<usize>,
}

impl RowBuilder {
    fn new(headers: &[String], options: &LoadOptions) -> Result<Self, LoadError> {
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        let position = |name: &str| -> Result<Option<usize>, LoadError> {
            let mut hits = columns.iter().enumerate().filter(|(_, c)| *c == name);
            let first = hits.next().map(|(i, _)| i);
            if hits.next().is_some() {
                return Err(LoadError::Malformed(format!("duplicate column '{name}'")));
            }
            Ok(first)
        };
        let required = |name: &str| -> Result<usize, LoadError> {
            position(name)?.ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        let date_exam = match options.temporal {
            TemporalMode::Off => None,
            TemporalMode::Auto => position(DATE_EXAM)?,
            TemporalMode::Required => Some(required(DATE_EXAM)?),
        };

        let core: Vec<usize> = REQUIRED_COLUMNS
            .iter()
            .map(|name| required(name))
            .collect::<Result<_, _>>()?;
        let extra = (0..columns.len())
            .filter(|i| !core.contains(i) && Some(*i) != date_exam)
            .collect();

        Ok(RowBuilder {
            age: required(AGE)?,
            sex: required(SEX)?,
            cp: required(CHEST_PAIN)?,
            chol: required(CHOLESTEROL)?,
            thalach: required(MAX_HEART_RATE)?,
            target: required(TARGET)?,
            date_exam,
            extra,
            columns,
        })
    }

    fn build(&self, row: usize, cells: &[&str]) -> Result<(Record, NumericText), LoadError> {
        if cells.len() != self.columns.len() {
            return Err(LoadError::Malformed(format!(
                "row {row} has {} fields, expected {}",
                cells.len(),
                self.columns.len()
            )));
        }
        let cell = |idx: usize| cells[idx].trim();
        let invalid = |column: &str, message: String| LoadError::InvalidValue {
            row,
            column: column.to_string(),
            message,
        };

        let age = parse_integer(cell(self.age))
            .filter(|&a| a > 0 && a <= i64::from(u32::MAX))
            .ok_or_else(|| invalid(AGE, format!("'{}' is not a positive integer", cell(self.age))))?;
        let sex = parse_integer(cell(self.sex))
            .and_then(Sex::from_code)
            .ok_or_else(|| invalid(SEX, format!("'{}' is not 0 or 1", cell(self.sex))))?;
        let cp = parse_integer(cell(self.cp))
            .and_then(ChestPain::from_code)
            .ok_or_else(|| invalid(CHEST_PAIN, format!("'{}' is not a code in 0..=3", cell(self.cp))))?;
        let chol = parse_float(cell(self.chol))
            .filter(|&c| c >= 0.0)
            .ok_or_else(|| invalid(CHOLESTEROL, format!("'{}' is not a non-negative number", cell(self.chol))))?;
        let thalach = parse_float(cell(self.thalach))
            .filter(|&t| t > 0.0)
            .ok_or_else(|| invalid(MAX_HEART_RATE, format!("'{}' is not a positive number", cell(self.thalach))))?;
        let target = parse_integer(cell(self.target))
            .and_then(Disease::from_code)
            .ok_or_else(|| invalid(TARGET, format!("'{}' is not 0 or 1", cell(self.target))))?;

        let date_exam = match self.date_exam {
            Some(idx) => Some(
                parse_date(cell(idx))
                    .ok_or_else(|| invalid(DATE_EXAM, format!("'{}' is not a recognised date", cell(idx))))?,
            ),
            None => None,
        };

        let record = Record {
            age: age as u32,
            sex,
            cp,
            chol,
            thalach,
            target,
            date_exam,
            extra: self.extra.iter().map(|&i| cells[i].to_string()).collect(),
        };
        let text = NumericText {
            chol: cell(self.chol).to_string(),
            thalach: cell(self.thalach).to_string(),
        };
        Ok((record, text))
    }

    fn finish(self, rows: Vec<(Record, NumericText)>) -> Result<Dataset, LoadError> {
        let temporal = self.date_exam.is_some();
        let (records, text): (Vec<Record>, Vec<NumericText>) = rows.into_iter().unzip();
        Dataset::new(records, self.columns, temporal)?.with_numeric_text(text)
    }
}

/// Integers may be written as `63` or, by float-typed writers, `63.0`.
fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse an exam date. Datetimes keep only their date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
