//! Fixed-threshold commentary on a summary report.
//!
//! The engine returns flags, not sentences; wording lives in the UI.

use serde::Serialize;

use super::filter::FilterCriteria;
use super::model::{ChestPain, Sex};
use super::summary::SummaryReport;

/// Prevalence above this is "high".
pub const HIGH_PREVALENCE_PCT: f64 = 60.0;
/// Prevalence below this is "low".
pub const LOW_PREVALENCE_PCT: f64 = 30.0;
/// Mean age above this raises the age-risk note.
pub const ELEVATED_AGE: f64 = 55.0;
/// Mean age above this, with only women selected, raises the attention note.
pub const OLDER_FEMALE_AGE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrevalenceBand {
    Low,
    Moderate,
    High,
}

impl PrevalenceBand {
    pub fn classify(pct: f64) -> Self {
        if pct > HIGH_PREVALENCE_PCT {
            PrevalenceBand::High
        } else if pct < LOW_PREVALENCE_PCT {
            PrevalenceBand::Low
        } else {
            PrevalenceBand::Moderate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "band")]
pub enum Headline {
    /// Nothing matched the filters; no other commentary follows.
    NoData,
    Prevalence(PrevalenceBand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "chest_pain")]
pub enum Note {
    ElevatedAgeRisk,
    OlderFemaleAttention,
    /// Temporal dashboards always name the most common chest-pain type.
    CommonChestPain(ChestPain),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub headline: Headline,
    pub notes: Vec<Note>,
}

impl Narrative {
    fn no_data() -> Self {
        Narrative {
            headline: Headline::NoData,
            notes: Vec::new(),
        }
    }

    pub fn has_note(&self, note: Note) -> bool {
        self.notes.contains(&note)
    }
}

/// Interpret `report`, produced from a view filtered by `criteria`.
///
/// The chest-pain sentence is added when `criteria` carries a date range,
/// which is exactly when the dataset is temporal.
pub fn interpret(report: &SummaryReport, criteria: &FilterCriteria) -> Narrative {
    if report.has_no_data {
        return Narrative::no_data();
    }
    let (Some(prevalence), Some(mean_age)) = (report.disease_prevalence_pct, report.mean_age) else {
        return Narrative::no_data();
    };

    let mut notes = Vec::new();
    if mean_age > ELEVATED_AGE {
        notes.push(Note::ElevatedAgeRisk);
    }
    if criteria.sex.selected() == Some(Sex::Female) && mean_age > OLDER_FEMALE_AGE {
        notes.push(Note::OlderFemaleAttention);
    }
    if criteria.date_range.is_some() {
        if let Some(cp) = report.modal_chest_pain {
            notes.push(Note::CommonChestPain(cp));
        }
    }

    Narrative {
        headline: Headline::Prevalence(PrevalenceBand::classify(prevalence)),
        notes,
    }
}
