//! Property-based tests for the filter and summary engine.
//!
//! Datasets are generated from arbitrary valid records; the properties must
//! hold for every dataset and every well-formed set of criteria.
//!
//! ```bash
//! PROPTEST_CASES=2000 cargo test --test engine_properties
//! ```

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use heart_dash::data::export::to_csv_bytes;
use heart_dash::data::filter::{apply, apply_predicates, Choice, FilterCriteria, FilteredView};
use heart_dash::data::loader::{read_csv, LoadOptions};
use heart_dash::data::model::{ChestPain, Dataset, Disease, Record, Sex, Span};
use heart_dash::data::narrative::{interpret, Headline};
use heart_dash::data::summary::summarize;
use heart_dash::error::InvalidCriteria;

// =============================================================================
// Strategies
// =============================================================================

fn first_exam_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

fn record() -> impl Strategy<Value = Record> {
    (
        29u32..=80,
        prop::bool::ANY,
        0usize..4,
        100.0f64..400.0,
        60.0f64..210.0,
        prop::bool::ANY,
        0u64..730,
    )
        .prop_map(|(age, male, cp, chol, thalach, sick, day)| Record {
            age,
            sex: if male { Sex::Male } else { Sex::Female },
            cp: ChestPain::ALL[cp],
            chol,
            thalach,
            target: if sick { Disease::Present } else { Disease::Absent },
            date_exam: first_exam_day().checked_add_days(Days::new(day)),
            extra: Vec::new(),
        })
}

/// Between 1 and 60 records, all dated or none dated.
fn dataset() -> impl Strategy<Value = Dataset> {
    (prop::collection::vec(record(), 1..60), prop::bool::ANY).prop_map(|(mut records, temporal)| {
        if !temporal {
            for rec in &mut records {
                rec.date_exam = None;
            }
        }
        Dataset::from_records(records).unwrap()
    })
}

fn choice<T: std::fmt::Debug + Clone + 'static>(values: Vec<T>) -> impl Strategy<Value = Choice<T>> {
    prop::option::of(prop::sample::select(values)).prop_map(Choice::from)
}

/// A dataset plus arbitrary well-formed criteria for it.
fn dataset_and_criteria() -> impl Strategy<Value = (Dataset, FilterCriteria)> {
    dataset().prop_flat_map(|ds| {
        let base = FilterCriteria::for_dataset(&ds);
        (
            Just(ds),
            choice(vec![Sex::Female, Sex::Male]),
            choice(Disease::ALL.to_vec()),
            choice(ChestPain::ALL.to_vec()),
            (20u32..90, 0u32..40),
            (0u64..730, 0u64..365),
        )
            .prop_map(move |(ds, sex, disease, chest_pain, (lo, width), (from, days))| {
                let date_range = base.date_range.map(|_| {
                    let start = first_exam_day() + Days::new(from);
                    Span::new("date", start, start + Days::new(days)).unwrap()
                });
                let criteria = FilterCriteria {
                    sex,
                    disease,
                    chest_pain,
                    age_range: Span::new("age", lo, lo + width).unwrap(),
                    date_range,
                };
                (ds, criteria)
            })
    })
}

fn is_subset(inner: &FilteredView<'_>, outer: &FilteredView<'_>) -> bool {
    inner.indices().iter().all(|i| outer.indices().contains(i))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn identity_criteria_keep_every_record(ds in dataset()) {
        let view = apply(&ds, &FilterCriteria::for_dataset(&ds));
        let all: Vec<usize> = (0..ds.len()).collect();
        prop_assert_eq!(view.indices(), all.as_slice());
    }

    #[test]
    fn view_preserves_dataset_order((ds, criteria) in dataset_and_criteria()) {
        let view = apply(&ds, &criteria);
        prop_assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
        for rec in view.records() {
            prop_assert!(criteria.matches(rec));
        }
    }

    #[test]
    fn narrowing_never_grows_the_view(
        (ds, criteria) in dataset_and_criteria(),
        trim_lo in 0u32..10,
        trim_hi in 0u32..10,
        sex in prop::sample::select(vec![Sex::Female, Sex::Male]),
    ) {
        let wide = apply(&ds, &criteria);

        let (lo, hi) = (criteria.age_range.start(), criteria.age_range.end());
        let new_lo = (lo + trim_lo).min(hi);
        let new_hi = hi.saturating_sub(trim_hi).max(new_lo);
        let mut narrow = criteria.clone();
        narrow.age_range = Span::new("age", new_lo, new_hi).unwrap();
        if narrow.sex == Choice::Any {
            narrow.sex = Choice::Only(sex);
        }

        let narrow_view = apply(&ds, &narrow);
        prop_assert!(narrow_view.len() <= wide.len());
        prop_assert!(is_subset(&narrow_view, &wide));
    }

    #[test]
    fn narrowing_any_single_dimension_never_grows_the_view(
        (ds, criteria) in dataset_and_criteria(),
        dimension in 0usize..5,
        pick in 0usize..4,
        trim_lo in 0u32..40,
        trim_hi in 0u32..40,
    ) {
        let mut wide = criteria.clone();
        let mut narrow = criteria;
        match dimension {
            0 => {
                wide.sex = Choice::Any;
                narrow.sex = Choice::Only([Sex::Female, Sex::Male][pick % 2]);
            }
            1 => {
                wide.disease = Choice::Any;
                narrow.disease = Choice::Only(Disease::ALL[pick % 2]);
            }
            2 => {
                wide.chest_pain = Choice::Any;
                narrow.chest_pain = Choice::Only(ChestPain::ALL[pick]);
            }
            3 => {
                let full = ds.age_bounds();
                let start = (full.start() + trim_lo).min(full.end());
                let end = full.end().saturating_sub(trim_hi).max(start);
                wide.age_range = full;
                narrow.age_range = Span::new("age", start, end).unwrap();
            }
            _ => {
                wide.date_range = ds.date_bounds();
                narrow.date_range = ds.date_bounds().map(|full| {
                    let start = (full.start() + Days::new(u64::from(trim_lo) * 10)).min(full.end());
                    let end = full
                        .end()
                        .checked_sub_days(Days::new(u64::from(trim_hi) * 10))
                        .unwrap_or(start)
                        .max(start);
                    Span::new("date", start, end).unwrap()
                });
            }
        }

        let wide_view = apply(&ds, &wide);
        let narrow_view = apply(&ds, &narrow);
        prop_assert!(narrow_view.len() <= wide_view.len());
        prop_assert!(is_subset(&narrow_view, &wide_view));
        for rec in narrow_view.records() {
            prop_assert!(wide.matches(rec));
        }
    }

    #[test]
    fn predicate_order_is_irrelevant(
        (ds, criteria) in dataset_and_criteria(),
        keys in prop::collection::vec(any::<u32>(), 5),
    ) {
        let natural = criteria.predicates();
        let mut shuffled: Vec<_> = natural.iter().copied().zip(keys).collect();
        shuffled.sort_by_key(|(_, k)| *k);
        let shuffled: Vec<_> = shuffled.into_iter().map(|(p, _)| p).collect();

        let a = apply_predicates(&ds, &natural);
        let b = apply_predicates(&ds, &shuffled);
        prop_assert_eq!(a.indices(), b.indices());
        let applied = apply(&ds, &criteria);
        prop_assert_eq!(a.indices(), applied.indices());
    }

    #[test]
    fn unmatched_criteria_report_no_data(ds in dataset()) {
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.age_range = Span::new("age", 200, 201).unwrap();
        let report = summarize(&apply(&ds, &criteria));

        prop_assert!(report.has_no_data);
        prop_assert_eq!(report.count, 0);
        prop_assert!(report.mean_age.is_none());
        prop_assert!(report.mean_cholesterol.is_none());
        prop_assert!(report.mean_max_heart_rate.is_none());
        prop_assert!(report.disease_prevalence_pct.is_none());
        prop_assert!(report.modal_chest_pain.is_none());

        let narrative = interpret(&report, &criteria);
        prop_assert_eq!(narrative.headline, Headline::NoData);
        prop_assert!(narrative.notes.is_empty());
    }

    #[test]
    fn summary_fields_stay_in_range((ds, criteria) in dataset_and_criteria()) {
        let view = apply(&ds, &criteria);
        let report = summarize(&view);
        prop_assert_eq!(report.count, view.len());
        prop_assert_eq!(report.has_no_data, view.is_empty());
        if let Some(pct) = report.disease_prevalence_pct {
            prop_assert!((0.0..=100.0).contains(&pct));
        }
        if let Some(mean_age) = report.mean_age {
            prop_assert!(mean_age >= f64::from(criteria.age_range.start()));
            prop_assert!(mean_age <= f64::from(criteria.age_range.end()));
        }
    }

    #[test]
    fn export_reloads_identical_records((ds, criteria) in dataset_and_criteria()) {
        let view = apply(&ds, &criteria);
        prop_assume!(!view.is_empty());

        let bytes = to_csv_bytes(&view).unwrap();
        let reloaded = read_csv(bytes.as_slice(), &LoadOptions::default()).unwrap();

        prop_assert_eq!(reloaded.columns(), ds.columns());
        let expected: Vec<&Record> = view.records().collect();
        let actual: Vec<&Record> = reloaded.records().iter().collect();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn inverted_age_span_is_rejected(lo in 1u32..150, gap in 1u32..50) {
        let err = Span::new("age", lo + gap, lo).unwrap_err();
        let is_inverted = matches!(err, InvalidCriteria::InvertedRange { .. });
        prop_assert!(is_inverted);
    }
}

#[test]
fn modal_tie_goes_to_smallest_code() {
    let records = [0, 0, 1, 1]
        .iter()
        .map(|&cp| Record::new(50, Sex::Male, ChestPain::ALL[cp], 200.0, 150.0, Disease::Absent))
        .collect();
    let ds = Dataset::from_records(records).unwrap();
    let report = summarize(&apply(&ds, &FilterCriteria::for_dataset(&ds)));
    assert_eq!(report.modal_chest_pain, Some(ChestPain::TypicalAngina));
}
