use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{InvalidCriteria, LoadError};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const AGE: &str = "age";
pub const SEX: &str = "sex";
pub const CHEST_PAIN: &str = "cp";
pub const CHOLESTEROL: &str = "chol";
pub const MAX_HEART_RATE: &str = "thalach";
pub const TARGET: &str = "target";
pub const DATE_EXAM: &str = "date_exam";

/// Columns every source must provide, in their canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = [AGE, SEX, CHEST_PAIN, CHOLESTEROL, MAX_HEART_RATE, TARGET];

// ---------------------------------------------------------------------------
// Categorical codes
// ---------------------------------------------------------------------------

/// Patient sex, stored as `0` (female) / `1` (male) in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn code(self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Sex::Female),
            1 => Some(Sex::Male),
            _ => None,
        }
    }
}

/// Heart-disease status, the `target` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disease {
    Absent,
    Present,
}

impl Disease {
    pub const ALL: [Disease; 2] = [Disease::Absent, Disease::Present];

    pub fn code(self) -> u8 {
        match self {
            Disease::Absent => 0,
            Disease::Present => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Disease::Absent),
            1 => Some(Disease::Present),
            _ => None,
        }
    }
}

/// Chest-pain category, the `cp` column (`0..=3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestPain {
    TypicalAngina,
    AtypicalAngina,
    NonAnginal,
    Asymptomatic,
}

impl ChestPain {
    pub const ALL: [ChestPain; 4] = [
        ChestPain::TypicalAngina,
        ChestPain::AtypicalAngina,
        ChestPain::NonAnginal,
        ChestPain::Asymptomatic,
    ];

    pub fn code(self) -> u8 {
        match self {
            ChestPain::TypicalAngina => 0,
            ChestPain::AtypicalAngina => 1,
            ChestPain::NonAnginal => 2,
            ChestPain::Asymptomatic => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|cp| i64::from(cp.code()) == code)
    }
}

// ---------------------------------------------------------------------------
// Span – inclusive range used for bounds and range filters
// ---------------------------------------------------------------------------

/// An inclusive `[start, end]` range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span<T> {
    start: T,
    end: T,
}

impl<T: PartialOrd + Copy + fmt::Display> Span<T> {
    /// Build a span, rejecting `start > end`. `dimension` names the
    /// filter in the error message.
    pub fn new(dimension: &'static str, start: T, end: T) -> Result<Self, InvalidCriteria> {
        if start > end {
            return Err(InvalidCriteria::InvertedRange {
                dimension,
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Span { start, end })
    }

    /// The single-point span `[value, value]`.
    pub fn point(value: T) -> Self {
        Span {
            start: value,
            end: value,
        }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn contains(&self, value: T) -> bool {
        self.start <= value && value <= self.end
    }

    /// Pull `value` into the span.
    pub fn clamp(&self, value: T) -> T {
        if value < self.start {
            self.start
        } else if value > self.end {
            self.end
        } else {
            value
        }
    }

    /// Widen the span so it also covers `value`.
    fn include(&mut self, value: T) {
        if value < self.start {
            self.start = value;
        }
        if value > self.end {
            self.end = value;
        }
    }
}

impl<T: fmt::Display> fmt::Display for Span<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Record – one patient exam
// ---------------------------------------------------------------------------

/// One patient exam (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Age in years, always > 0.
    pub age: u32,
    pub sex: Sex,
    pub cp: ChestPain,
    /// Serum cholesterol in mg/dL, >= 0.
    pub chol: f64,
    /// Maximum heart rate achieved, > 0.
    pub thalach: f64,
    pub target: Disease,
    /// Exam date, only set for temporal datasets.
    pub date_exam: Option<NaiveDate>,
    /// Raw text of the non-core source columns, aligned with
    /// [`Dataset::extra_columns`].
    pub extra: Vec<String>,
}

impl Record {
    pub fn new(age: u32, sex: Sex, cp: ChestPain, chol: f64, thalach: f64, target: Disease) -> Self {
        Record {
            age,
            sex,
            cp,
            chol,
            thalach,
            target,
            date_exam: None,
            extra: Vec::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date_exam = Some(date);
        self
    }
}

/// Source text of a record's float cells. Export writes it back so a file's
/// own precision survives (`233.0` stays `233.0`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericText {
    pub chol: String,
    pub thalach: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The immutable loaded table with bounds pre-computed at construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    /// Source column order, used again on export.
    columns: Vec<String>,
    extra_columns: Vec<String>,
    age_bounds: Span<u32>,
    chest_pain_types: Vec<ChestPain>,
    date_bounds: Option<Span<NaiveDate>>,
    /// Empty, or aligned with `records`.
    numeric_text: Vec<NumericText>,
}

impl Dataset {
    /// Build a dataset from parsed records.
    ///
    /// `columns` is the source header order; every name outside
    /// [`REQUIRED_COLUMNS`] (and `date_exam` when `temporal`) is an extra
    /// column whose raw values live in [`Record::extra`]. A temporal dataset
    /// needs a `date_exam` column and a date on every record.
    pub fn new(records: Vec<Record>, columns: Vec<String>, temporal: bool) -> Result<Self, LoadError> {
        let first = records.first().ok_or(LoadError::Empty)?;
        if temporal && !columns.iter().any(|c| c == DATE_EXAM) {
            return Err(LoadError::MissingColumn(DATE_EXAM.to_string()));
        }
        let extra_columns: Vec<String> = columns
            .iter()
            .filter(|c| !is_core_column(c, temporal))
            .cloned()
            .collect();

        let mut age_bounds = Span::point(first.age);
        let mut chest_pain: BTreeSet<ChestPain> = BTreeSet::new();
        let mut date_bounds: Option<Span<NaiveDate>> = None;

        for (i, rec) in records.iter().enumerate() {
            age_bounds.include(rec.age);
            chest_pain.insert(rec.cp);

            if rec.extra.len() != extra_columns.len() {
                return Err(LoadError::Malformed(format!(
                    "record {} has {} extra values, expected {}",
                    i + 1,
                    rec.extra.len(),
                    extra_columns.len()
                )));
            }

            if temporal {
                let date = rec.date_exam.ok_or_else(|| LoadError::InvalidValue {
                    row: i + 1,
                    column: DATE_EXAM.to_string(),
                    message: "missing exam date".to_string(),
                })?;
                match date_bounds.as_mut() {
                    Some(span) => span.include(date),
                    None => date_bounds = Some(Span::point(date)),
                }
            }
        }

        Ok(Dataset {
            records,
            columns,
            extra_columns,
            age_bounds,
            chest_pain_types: chest_pain.into_iter().collect(),
            date_bounds,
            numeric_text: Vec::new(),
        })
    }

    /// Build a dataset with the canonical column set (plus `date_exam` when
    /// every record has a date). Handy for synthetic data.
    pub fn from_records(records: Vec<Record>) -> Result<Self, LoadError> {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let temporal = !records.is_empty() && records.iter().all(|r| r.date_exam.is_some());
        if temporal {
            columns.push(DATE_EXAM.to_string());
        }
        Self::new(records, columns, temporal)
    }

    /// Attach the source text of every record's float cells, one entry per
    /// record in order.
    pub fn with_numeric_text(mut self, text: Vec<NumericText>) -> Result<Self, LoadError> {
        if text.len() != self.records.len() {
            return Err(LoadError::Malformed(format!(
                "{} numeric text entries for {} records",
                text.len(),
                self.records.len()
            )));
        }
        self.numeric_text = text;
        Ok(self)
    }

    /// Source text for record `index`, if the dataset was loaded from a file.
    pub fn numeric_text(&self, index: usize) -> Option<&NumericText> {
        self.numeric_text.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty. Always false for a constructed dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Observed `[min, max]` age.
    pub fn age_bounds(&self) -> Span<u32> {
        self.age_bounds
    }

    /// Distinct chest-pain types, sorted by code.
    pub fn chest_pain_types(&self) -> &[ChestPain] {
        &self.chest_pain_types
    }

    /// Observed exam-date range; `None` unless the dataset is temporal.
    pub fn date_bounds(&self) -> Option<Span<NaiveDate>> {
        self.date_bounds
    }

    pub fn is_temporal(&self) -> bool {
        self.date_bounds.is_some()
    }

    pub fn ages(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|r| r.age)
    }

    pub fn cholesterol(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.chol)
    }

    pub fn max_heart_rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.thalach)
    }

    pub fn targets(&self) -> impl Iterator<Item = Disease> + '_ {
        self.records.iter().map(|r| r.target)
    }
}

fn is_core_column(name: &str, temporal: bool) -> bool {
    (temporal && name == DATE_EXAM) || REQUIRED_COLUMNS.contains(&name)
}
