//! Command-line / environment configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::data::charts::{DEFAULT_AGE_BINS, MAX_AGE_BINS};
use crate::data::filter::{Choice, FilterCriteria};
use crate::data::loader::{LoadOptions, TemporalMode};
use crate::data::model::{ChestPain, Dataset, Disease, Sex, Span};
use crate::error::InvalidCriteria;

/// heart-dash: interactive dashboard over cardiac patient records
#[derive(Debug, Clone, Parser)]
#[command(name = "heart-dash")]
#[command(version, about, long_about = None)]
pub struct DashboardConfig {
    /// Dataset loaded at startup (.csv, .json or .parquet)
    #[arg(long, value_name = "FILE", env = "HEART_DASH_DATA", default_value = "heart.csv")]
    pub data: PathBuf,

    /// Whether the `date_exam` column drives the temporal features
    #[arg(long, value_enum, env = "HEART_DASH_TEMPORAL", default_value = "auto")]
    pub temporal: TemporalMode,

    /// Number of bins in the age histogram
    #[arg(
        long,
        default_value_t = DEFAULT_AGE_BINS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_AGE_BINS as u64)
    )]
    pub bins: usize,

    /// Suggested file name for the filtered-data download
    #[arg(long, default_value = "filtered_heart_data.csv")]
    pub export_name: String,

    /// Print the JSON summary for the criteria below and exit
    #[arg(long)]
    pub headless: bool,

    /// Headless mode: also write the filtered records to this CSV file
    #[arg(long, value_name = "FILE", requires = "headless")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

/// Initial filter selection; anything unset means "all".
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CriteriaArgs {
    #[arg(long, value_enum, default_value = "any")]
    pub sex: SexArg,

    #[arg(long, value_enum, default_value = "any")]
    pub disease: DiseaseArg,

    /// Chest-pain type code (0-3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub cp: Option<u8>,

    #[arg(long)]
    pub age_min: Option<u32>,

    #[arg(long)]
    pub age_max: Option<u32>,

    /// First exam date (YYYY-MM-DD)
    #[arg(long)]
    pub date_from: Option<NaiveDate>,

    /// Last exam date (YYYY-MM-DD)
    #[arg(long)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SexArg {
    #[default]
    Any,
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DiseaseArg {
    #[default]
    Any,
    Present,
    Absent,
}

impl DashboardConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            temporal: self.temporal,
        }
    }
}

impl CriteriaArgs {
    /// Build criteria for `dataset`, clamping range endpoints into the
    /// observed bounds. An inverted range after clamping is rejected.
    pub fn to_criteria(&self, dataset: &Dataset) -> Result<FilterCriteria, InvalidCriteria> {
        let mut criteria = FilterCriteria::for_dataset(dataset);

        criteria.sex = match self.sex {
            SexArg::Any => Choice::Any,
            SexArg::Male => Choice::Only(Sex::Male),
            SexArg::Female => Choice::Only(Sex::Female),
        };
        criteria.disease = match self.disease {
            DiseaseArg::Any => Choice::Any,
            DiseaseArg::Present => Choice::Only(Disease::Present),
            DiseaseArg::Absent => Choice::Only(Disease::Absent),
        };
        criteria.chest_pain = Choice::from(self.cp.and_then(|c| ChestPain::from_code(i64::from(c))));

        let ages = dataset.age_bounds();
        criteria.age_range = Span::new(
            "age",
            clamped("age", ages, self.age_min),
            clamped("age", ages, self.age_max.or(Some(ages.end()))),
        )?;

        if let Some(dates) = dataset.date_bounds() {
            criteria.date_range = Some(Span::new(
                "date",
                clamped("date", dates, self.date_from),
                clamped("date", dates, self.date_to.or(Some(dates.end()))),
            )?);
        } else if self.date_from.is_some() || self.date_to.is_some() {
            log::warn!("dataset has no exam dates, ignoring date range");
        }

        Ok(criteria)
    }
}

/// `value` pulled into `bounds`; `None` means the lower bound.
fn clamped<T>(dimension: &str, bounds: Span<T>, value: Option<T>) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    match value {
        None => bounds.start(),
        Some(v) => {
            let c = bounds.clamp(v);
            if c != v {
                log::warn!("{dimension} {v} outside {bounds}, clamped to {c}");
            }
            c
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn dataset() -> Dataset {
        let d = |m| NaiveDate::from_ymd_opt(2023, m, 1).unwrap();
        Dataset::from_records(vec![
            Record::new(35, Sex::Male, ChestPain::TypicalAngina, 200.0, 150.0, Disease::Absent).with_date(d(1)),
            Record::new(70, Sex::Female, ChestPain::Asymptomatic, 260.0, 120.0, Disease::Present).with_date(d(6)),
        ])
        .unwrap()
    }

    #[test]
    fn parses_flags_with_defaults() {
        let config = DashboardConfig::try_parse_from(["heart-dash"]).unwrap();
        assert_eq!(config.data, PathBuf::from("heart.csv"));
        assert_eq!(config.temporal, TemporalMode::Auto);
        assert_eq!(config.bins, 20);
        assert!(!config.headless);
        assert_eq!(config.criteria.sex, SexArg::Any);
    }

    #[test]
    fn export_requires_headless() {
        assert!(DashboardConfig::try_parse_from(["heart-dash", "--export", "out.csv"]).is_err());
        let ok = DashboardConfig::try_parse_from(["heart-dash", "--headless", "--export", "out.csv"]);
        assert!(ok.is_ok());
    }

    #[test]
    fn bin_count_is_bounded() {
        let parse = |bins: &str| DashboardConfig::try_parse_from(["heart-dash", "--bins", bins]);
        assert_eq!(parse("50").unwrap().bins, 50);
        assert_eq!(parse("200").unwrap().bins, MAX_AGE_BINS);
        assert!(parse("0").is_err());
        assert!(parse("201").is_err());
        assert!(parse("18446744073709551615").is_err());
    }

    #[test]
    fn chest_pain_code_is_range_checked() {
        assert!(DashboardConfig::try_parse_from(["heart-dash", "--cp", "4"]).is_err());
    }

    #[test]
    fn unset_flags_give_identity_criteria() {
        let ds = dataset();
        let criteria = CriteriaArgs::default().to_criteria(&ds).unwrap();
        assert_eq!(criteria, FilterCriteria::for_dataset(&ds));
    }

    #[test]
    fn ranges_are_clamped_to_observed_bounds() {
        let ds = dataset();
        let args = CriteriaArgs {
            sex: SexArg::Female,
            age_min: Some(10),
            age_max: Some(500),
            ..CriteriaArgs::default()
        };
        let criteria = args.to_criteria(&ds).unwrap();
        assert_eq!(criteria.age_range, ds.age_bounds());
        assert_eq!(criteria.sex, Choice::Only(Sex::Female));
    }

    #[test]
    fn inverted_range_is_invalid() {
        let args = CriteriaArgs {
            age_min: Some(60),
            age_max: Some(40),
            ..CriteriaArgs::default()
        };
        let err = args.to_criteria(&dataset()).unwrap_err();
        assert!(matches!(err, InvalidCriteria::InvertedRange { dimension: "age", .. }));
    }
}
