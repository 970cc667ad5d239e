use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::filter::FilteredView;
use super::model::Disease;

// ---------------------------------------------------------------------------
// Chart-ready aggregates
// ---------------------------------------------------------------------------

/// Default number of age-histogram bins.
pub const DEFAULT_AGE_BINS: usize = 20;

/// Largest accepted age-histogram bin count.
pub const MAX_AGE_BINS: usize = 200;

/// Absent / present counts, used for the pie split and per histogram bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiseaseCounts {
    pub absent: usize,
    pub present: usize,
}

impl DiseaseCounts {
    pub fn add(&mut self, disease: Disease) {
        match disease {
            Disease::Absent => self.absent += 1,
            Disease::Present => self.present += 1,
        }
    }

    pub fn get(&self, disease: Disease) -> usize {
        match disease {
            Disease::Absent => self.absent,
            Disease::Present => self.present,
        }
    }

    pub fn total(&self) -> usize {
        self.absent + self.present
    }
}

/// One histogram bin covering `[start, end)` years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBin {
    pub start: f64,
    pub end: f64,
    pub counts: DiseaseCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub age: u32,
    pub chol: f64,
    pub disease: Disease,
}

/// Box-plot numbers for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub disease: Disease,
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Everything the dashboard plots for one filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub disease_split: DiseaseCounts,
    pub age_histogram: Vec<AgeBin>,
    pub age_vs_cholesterol: Vec<ScatterPoint>,
    pub heart_rate_by_disease: Vec<BoxSummary>,
    /// `None` unless the dataset is temporal.
    pub exams_per_month: Option<Vec<MonthCount>>,
}

/// Build every chart series for `view`. `bins` is clamped to
/// `1..=MAX_AGE_BINS`.
pub fn chart_data(view: &FilteredView<'_>, bins: usize) -> ChartData {
    let temporal = view.dataset().is_temporal();
    let mut data = ChartData {
        exams_per_month: temporal.then(Vec::new),
        ..ChartData::default()
    };
    if view.is_empty() {
        return data;
    }

    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for rec in view.records() {
        data.disease_split.add(rec.target);
        data.age_vs_cholesterol.push(ScatterPoint {
            age: rec.age,
            chol: rec.chol,
            disease: rec.target,
        });
        if let Some(date) = rec.date_exam {
            *months.entry((date.year(), date.month())).or_default() += 1;
        }
    }

    data.age_histogram = age_histogram(view, bins.clamp(1, MAX_AGE_BINS));
    data.heart_rate_by_disease = Disease::ALL
        .into_iter()
        .filter_map(|disease| {
            let values: Vec<f64> = view
                .records()
                .filter(|r| r.target == disease)
                .map(|r| r.thalach)
                .collect();
            box_summary(disease, values)
        })
        .collect();
    if temporal {
        data.exams_per_month = Some(
            months
                .into_iter()
                .map(|((year, month), count)| MonthCount { year, month, count })
                .collect(),
        );
    }
    data
}

/// Equal-width bins over `[min_age, max_age + 1)`.
fn age_histogram(view: &FilteredView<'_>, bins: usize) -> Vec<AgeBin> {
    let (lo, hi) = view
        .records()
        .fold((u32::MAX, 0), |(lo, hi), r| (lo.min(r.age), hi.max(r.age)));
    let start = f64::from(lo);
    let width = (f64::from(hi) + 1.0 - start) / bins as f64;

    let mut out: Vec<AgeBin> = (0..bins)
        .map(|i| AgeBin {
            start: start + width * i as f64,
            end: start + width * (i + 1) as f64,
            counts: DiseaseCounts::default(),
        })
        .collect();

    for rec in view.records() {
        let idx = ((f64::from(rec.age) - start) / width) as usize;
        out[idx.min(bins - 1)].counts.add(rec.target);
    }
    out
}

/// Tukey box: quartiles by linear interpolation, whiskers at the most
/// extreme points within 1.5 IQR of the box.
fn box_summary(disease: Disease, mut values: Vec<f64>) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let inside = || values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside().fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxSummary {
        disease,
        count: values.len(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// Linear-interpolated quantile of sorted, non-empty `values`.
fn quantile(values: &[f64], p: f64) -> f64 {
    let pos = p * (values.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * frac
}
