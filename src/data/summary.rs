use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{ChestPain, Disease};

/// Statistics over a filtered view.
///
/// When the view is empty `has_no_data` is set and every derived field is
/// `None`; a zero mean and "no rows" are never conflated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub count: usize,
    pub has_no_data: bool,
    pub mean_age: Option<f64>,
    pub mean_cholesterol: Option<f64>,
    pub mean_max_heart_rate: Option<f64>,
    pub disease_prevalence_pct: Option<f64>,
    /// Most frequent chest-pain type; ties go to the smallest code.
    pub modal_chest_pain: Option<ChestPain>,
}

impl SummaryReport {
    fn empty() -> Self {
        SummaryReport {
            count: 0,
            has_no_data: true,
            mean_age: None,
            mean_cholesterol: None,
            mean_max_heart_rate: None,
            disease_prevalence_pct: None,
            modal_chest_pain: None,
        }
    }
}

/// Compute the summary report for `view`.
pub fn summarize(view: &FilteredView<'_>) -> SummaryReport {
    if view.is_empty() {
        return SummaryReport::empty();
    }

    let count = view.len();
    let n = count as f64;
    let mut age_sum = 0.0;
    let mut chol_sum = 0.0;
    let mut thalach_sum = 0.0;
    let mut present = 0usize;
    let mut cp_counts: BTreeMap<ChestPain, usize> = BTreeMap::new();

    for rec in view.records() {
        age_sum += f64::from(rec.age);
        chol_sum += rec.chol;
        thalach_sum += rec.thalach;
        if rec.target == Disease::Present {
            present += 1;
        }
        *cp_counts.entry(rec.cp).or_default() += 1;
    }

    SummaryReport {
        count,
        has_no_data: false,
        mean_age: Some(age_sum / n),
        mean_cholesterol: Some(chol_sum / n),
        mean_max_heart_rate: Some(thalach_sum / n),
        disease_prevalence_pct: Some(100.0 * present as f64 / n),
        modal_chest_pain: modal(&cp_counts),
    }
}

/// Highest count wins; the map iterates by ascending code so the first
/// maximum is the smallest code.
fn modal(counts: &BTreeMap<ChestPain, usize>) -> Option<ChestPain> {
    let mut best: Option<(ChestPain, usize)> = None;
    for (&cp, &n) in counts {
        match best {
            Some((_, top)) if n <= top => {}
            _ => best = Some((cp, n)),
        }
    }
    best.map(|(cp, _)| cp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::{Dataset, Record, Sex, Span};

    fn rec(age: u32, cp: ChestPain, chol: f64, target: Disease) -> Record {
        Record::new(age, Sex::Male, cp, chol, 150.0, target)
    }

    #[test]
    fn means_and_prevalence() {
        let ds = Dataset::from_records(vec![
            rec(40, ChestPain::TypicalAngina, 200.0, Disease::Absent),
            rec(50, ChestPain::NonAnginal, 250.0, Disease::Present),
            rec(60, ChestPain::NonAnginal, 300.0, Disease::Present),
            rec(70, ChestPain::Asymptomatic, 250.0, Disease::Absent),
        ])
        .unwrap();
        let report = summarize(&apply(&ds, &FilterCriteria::for_dataset(&ds)));

        assert_eq!(report.count, 4);
        assert!(!report.has_no_data);
        assert_eq!(report.mean_age, Some(55.0));
        assert_eq!(report.mean_cholesterol, Some(250.0));
        assert_eq!(report.mean_max_heart_rate, Some(150.0));
        assert_eq!(report.disease_prevalence_pct, Some(50.0));
        assert_eq!(report.modal_chest_pain, Some(ChestPain::NonAnginal));
    }

    #[test]
    fn modal_tie_goes_to_smallest_code() {
        let ds = Dataset::from_records(vec![
            rec(40, ChestPain::AtypicalAngina, 200.0, Disease::Absent),
            rec(41, ChestPain::TypicalAngina, 200.0, Disease::Absent),
            rec(42, ChestPain::AtypicalAngina, 200.0, Disease::Absent),
            rec(43, ChestPain::TypicalAngina, 200.0, Disease::Absent),
        ])
        .unwrap();
        let report = summarize(&apply(&ds, &FilterCriteria::for_dataset(&ds)));
        assert_eq!(report.modal_chest_pain, Some(ChestPain::TypicalAngina));
    }

    #[test]
    fn empty_view_has_no_numbers() {
        let ds = Dataset::from_records(vec![rec(40, ChestPain::TypicalAngina, 0.0, Disease::Absent)])
            .unwrap();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.age_range = Span::new("age", 200, 201).unwrap();
        let report = summarize(&apply(&ds, &criteria));

        assert_eq!(report, SummaryReport::empty());
    }

    #[test]
    fn zero_values_are_not_no_data() {
        let ds = Dataset::from_records(vec![rec(40, ChestPain::TypicalAngina, 0.0, Disease::Absent)])
            .unwrap();
        let report = summarize(&apply(&ds, &FilterCriteria::for_dataset(&ds)));
        assert!(!report.has_no_data);
        assert_eq!(report.mean_cholesterol, Some(0.0));
        assert_eq!(report.disease_prevalence_pct, Some(0.0));
    }

    #[test]
    fn serializes_missing_fields_as_null() {
        let json = serde_json::to_value(SummaryReport::empty()).unwrap();
        assert_eq!(json["has_no_data"], true);
        assert!(json["mean_age"].is_null());
    }
}
