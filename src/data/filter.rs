use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::model::{ChestPain, Dataset, Disease, Record, Sex, Span};

// ---------------------------------------------------------------------------
// Filter criteria: one selection per dimension
// ---------------------------------------------------------------------------

/// A categorical selection: everything, or exactly one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice<T> {
    Any,
    Only(T),
}

impl<T: PartialEq + Copy> Choice<T> {
    /// `Any` matches every value.
    pub fn matches(&self, value: T) -> bool {
        match self {
            Choice::Any => true,
            Choice::Only(wanted) => *wanted == value,
        }
    }

    pub fn selected(&self) -> Option<T> {
        match self {
            Choice::Any => None,
            Choice::Only(v) => Some(*v),
        }
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Choice::Only(v),
            None => Choice::Any,
        }
    }
}

/// The sidebar selection. Always fully specified: unset dimensions are
/// `Any` or the dataset's full observed range, never an empty range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub sex: Choice<Sex>,
    pub disease: Choice<Disease>,
    pub chest_pain: Choice<ChestPain>,
    pub age_range: Span<u32>,
    /// Present exactly when the dataset is temporal.
    pub date_range: Option<Span<NaiveDate>>,
}

impl FilterCriteria {
    /// The identity filter for `dataset`: every dimension unrestricted.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        FilterCriteria {
            sex: Choice::Any,
            disease: Choice::Any,
            chest_pain: Choice::Any,
            age_range: dataset.age_bounds(),
            date_range: dataset.date_bounds(),
        }
    }

    /// The active predicates in their natural order. The age predicate is
    /// always present (vacuous at full range); categorical dimensions set to
    /// `Any` contribute nothing.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = vec![Predicate::Age(self.age_range)];
        if let Some(sex) = self.sex.selected() {
            preds.push(Predicate::Sex(sex));
        }
        if let Some(disease) = self.disease.selected() {
            preds.push(Predicate::Disease(disease));
        }
        if let Some(cp) = self.chest_pain.selected() {
            preds.push(Predicate::ChestPain(cp));
        }
        if let Some(range) = self.date_range {
            preds.push(Predicate::ExamDate(range));
        }
        preds
    }

    /// Whether `record` passes every dimension.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates().iter().all(|p| p.matches(record))
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sex={:?} disease={:?} cp={:?} age={}",
            self.sex, self.disease, self.chest_pain, self.age_range
        )?;
        if let Some(range) = &self.date_range {
            write!(f, " date={range}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// One filter dimension, checked independently of the others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    Age(Span<u32>),
    Sex(Sex),
    Disease(Disease),
    ChestPain(ChestPain),
    /// Records without an exam date never match a date range.
    ExamDate(Span<NaiveDate>),
}

impl Predicate {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Age(range) => range.contains(record.age),
            Predicate::Sex(sex) => record.sex == *sex,
            Predicate::Disease(disease) => record.target == *disease,
            Predicate::ChestPain(cp) => record.cp == *cp,
            Predicate::ExamDate(range) => record.date_exam.is_some_and(|d| range.contains(d)),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The records of a dataset that passed a filter, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Positions of the matching records within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&'a Record> {
        let dataset = self.dataset;
        self.indices.get(i).map(|&idx| &dataset.records()[idx])
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&idx| &records[idx])
    }
}

/// Return the view of records that pass all of `criteria`.
///
/// Never fails: an empty view is a normal outcome.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let view = apply_predicates(dataset, &criteria.predicates());
    log::debug!("filter {criteria} -> {} of {} records", view.len(), dataset.len());
    view
}

/// Return the view of records passing every predicate. The order of
/// `predicates` does not affect the result.
pub fn apply_predicates<'a>(dataset: &'a Dataset, predicates: &[Predicate]) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| predicates.iter().all(|p| p.matches(rec)))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let d = |m, day| NaiveDate::from_ymd_opt(2023, m, day).unwrap();
        Dataset::from_records(vec![
            Record::new(63, Sex::Male, ChestPain::Asymptomatic, 233.0, 150.0, Disease::Present)
                .with_date(d(1, 10)),
            Record::new(37, Sex::Male, ChestPain::NonAnginal, 250.0, 187.0, Disease::Present)
                .with_date(d(2, 10)),
            Record::new(41, Sex::Female, ChestPain::AtypicalAngina, 204.0, 172.0, Disease::Absent)
                .with_date(d(3, 10)),
            Record::new(56, Sex::Female, ChestPain::AtypicalAngina, 236.0, 178.0, Disease::Present)
                .with_date(d(4, 10)),
            Record::new(62, Sex::Female, ChestPain::TypicalAngina, 268.0, 160.0, Disease::Absent)
                .with_date(d(5, 10)),
        ])
        .unwrap()
    }

    #[test]
    fn default_criteria_is_identity() {
        let ds = sample();
        let criteria = FilterCriteria::for_dataset(&ds);
        let view = apply(&ds, &criteria);
        assert_eq!(view.indices(), &[0, 1, 2, 3, 4]);
        assert!(criteria.date_range.is_some());
    }

    #[test]
    fn dimensions_combine_with_and() {
        let ds = sample();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.sex = Choice::Only(Sex::Female);
        criteria.age_range = Span::new("age", 40, 60).unwrap();
        assert_eq!(apply(&ds, &criteria).indices(), &[2, 3]);

        criteria.disease = Choice::Only(Disease::Present);
        assert_eq!(apply(&ds, &criteria).indices(), &[3]);

        criteria.chest_pain = Choice::Only(ChestPain::TypicalAngina);
        assert!(apply(&ds, &criteria).is_empty());
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let ds = sample();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.age_range = Span::new("age", 37, 41).unwrap();
        assert_eq!(apply(&ds, &criteria).indices(), &[1, 2]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let ds = sample();
        let d = |m, day| NaiveDate::from_ymd_opt(2023, m, day).unwrap();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.date_range = Some(Span::new("date", d(2, 10), d(4, 10)).unwrap());
        assert_eq!(apply(&ds, &criteria).indices(), &[1, 2, 3]);
    }

    #[test]
    fn predicate_order_does_not_matter() {
        let ds = sample();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.sex = Choice::Only(Sex::Female);
        criteria.disease = Choice::Only(Disease::Absent);

        let forward = criteria.predicates();
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            apply_predicates(&ds, &forward).indices(),
            apply_predicates(&ds, &reversed).indices()
        );
    }

    #[test]
    fn view_iterates_in_dataset_order() {
        let ds = sample();
        let mut criteria = FilterCriteria::for_dataset(&ds);
        criteria.sex = Choice::Only(Sex::Female);
        let view = apply(&ds, &criteria);
        let ages: Vec<u32> = view.records().map(|r| r.age).collect();
        assert_eq!(ages, vec![41, 56, 62]);
        assert_eq!(view.get(1).map(|r| r.age), Some(56));
        assert_eq!(view.get(3), None);
    }

    #[test]
    fn choice_from_option() {
        assert_eq!(Choice::from(Some(Sex::Male)), Choice::Only(Sex::Male));
        assert_eq!(Choice::<Sex>::from(None), Choice::Any);
        assert!(Choice::<Sex>::Any.matches(Sex::Female));
    }
}
