//! Display strings for the engine's codes and flags.

use heart_dash::data::filter::Choice;
use heart_dash::data::model::{ChestPain, Disease, Sex};
use heart_dash::data::narrative::{Headline, Note, PrevalenceBand};

pub fn sex(sex: Sex) -> &'static str {
    match sex {
        Sex::Female => "Female",
        Sex::Male => "Male",
    }
}

pub fn disease(disease: Disease) -> &'static str {
    match disease {
        Disease::Absent => "No disease",
        Disease::Present => "Disease",
    }
}

pub fn chest_pain(cp: ChestPain) -> String {
    let name = match cp {
        ChestPain::TypicalAngina => "typical angina",
        ChestPain::AtypicalAngina => "atypical angina",
        ChestPain::NonAnginal => "non-anginal pain",
        ChestPain::Asymptomatic => "asymptomatic",
    };
    format!("{} ({name})", cp.code())
}

/// Combo-box text for a selection.
pub fn choice<T: Copy>(choice: &Choice<T>, label: impl Fn(T) -> String) -> String {
    match choice {
        Choice::Any => "All".to_string(),
        Choice::Only(v) => label(*v),
    }
}

/// `None` renders as "n/a", never as zero.
pub fn metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1}{unit}"),
        None => "n/a".to_string(),
    }
}

pub fn headline(headline: Headline) -> String {
    match headline {
        Headline::NoData => "No data matches the selected filters.".to_string(),
        Headline::Prevalence(band) => {
            let band = match band {
                PrevalenceBand::High => "high",
                PrevalenceBand::Moderate => "moderate",
                PrevalenceBand::Low => "low",
            };
            format!("Heart-disease prevalence in this selection is {band}.")
        }
    }
}

pub fn note(note: Note) -> String {
    match note {
        Note::ElevatedAgeRisk => {
            "Mean age is above 55: age is an elevated risk factor here.".to_string()
        }
        Note::OlderFemaleAttention => {
            "Women in this selection average over 60 years and deserve particular attention."
                .to_string()
        }
        Note::CommonChestPain(cp) => {
            format!("The most common chest-pain type is {}.", chest_pain(cp))
        }
    }
}
