use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use heart_dash::config::DashboardConfig;
use heart_dash::data::charts::{chart_data, ChartData};
use heart_dash::data::export;
use heart_dash::data::filter::{apply, FilterCriteria, FilteredView};
use heart_dash::data::loader::load_file;
use heart_dash::data::model::{Dataset, Disease, Span};
use heart_dash::data::narrative::{interpret, Narrative};
use heart_dash::data::summary::{summarize, SummaryReport};

use crate::color::{disease_colors, ColorMap};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything derived from the current criteria, recomputed together.
pub struct Derived {
    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,
    pub report: SummaryReport,
    pub narrative: Narrative,
    pub charts: ChartData,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Dataset>,

    /// Current sidebar selection; always valid for `dataset`.
    pub criteria: Option<FilterCriteria>,

    /// Cached engine output for `criteria`.
    pub derived: Option<Derived>,

    pub disease_colors: ColorMap<Disease>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            criteria: None,
            derived: None,
            disease_colors: disease_colors(),
            status_message: None,
        }
    }

    /// Load `path`, replacing the current dataset on success. On failure the
    /// previous dataset is kept and the error is shown.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path, &self.config.load_options()) {
            Ok(dataset) => {
                let criteria = match self.config.criteria.to_criteria(&dataset) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("Ignoring initial criteria: {e}");
                        FilterCriteria::for_dataset(&dataset)
                    }
                };
                self.set_dataset(dataset, criteria);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset with its starting criteria.
    pub fn set_dataset(&mut self, dataset: Dataset, criteria: FilterCriteria) {
        self.dataset = Some(dataset);
        self.criteria = Some(criteria);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the view, report, narrative and charts.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(criteria)) = (&self.dataset, &self.criteria) else {
            self.derived = None;
            return;
        };
        let view = apply(ds, criteria);
        let report = summarize(&view);
        let narrative = interpret(&report, criteria);
        let charts = chart_data(&view, self.config.bins);
        self.derived = Some(Derived {
            visible_indices: view.indices().to_vec(),
            report,
            narrative,
            charts,
        });
    }

    /// Back to the identity filter.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = Some(FilterCriteria::for_dataset(ds));
            self.refilter();
        }
    }

    /// Apply a criteria edit and refresh the derived output.
    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        if let Some(criteria) = self.criteria.as_mut() {
            edit(criteria);
            self.refilter();
        }
    }

    /// Move the lower age bound, never past the upper one.
    pub fn set_age_min(&mut self, value: u32) {
        self.update_criteria(|c| {
            let end = c.age_range.end();
            c.age_range = narrowed(c.age_range, value.min(end), end, "age");
        });
    }

    /// Move the upper age bound, never below the lower one.
    pub fn set_age_max(&mut self, value: u32) {
        self.update_criteria(|c| {
            let start = c.age_range.start();
            c.age_range = narrowed(c.age_range, start, value.max(start), "age");
        });
    }

    pub fn set_date_start(&mut self, value: NaiveDate) {
        self.update_criteria(|c| {
            if let Some(range) = c.date_range {
                let end = range.end();
                c.date_range = Some(narrowed(range, value.min(end), end, "date"));
            }
        });
    }

    pub fn set_date_end(&mut self, value: NaiveDate) {
        self.update_criteria(|c| {
            if let Some(range) = c.date_range {
                let start = range.start();
                c.date_range = Some(narrowed(range, start, value.max(start), "date"));
            }
        });
    }

    /// The current view, rebuilt from the criteria.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        Some(apply(self.dataset.as_ref()?, self.criteria.as_ref()?))
    }

    /// Write the current view to `path` as CSV.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        let view = self.view().context("no dataset loaded")?;
        export::write_csv(&view, path)
            .with_context(|| format!("exporting to {}", path.display()))?;
        Ok(view.len())
    }
}

/// Build `[start, end]`; keeps `current` if the pair is somehow inverted.
fn narrowed<T>(current: Span<T>, start: T, end: T, dimension: &'static str) -> Span<T>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    match Span::new(dimension, start, end) {
        Ok(span) => span,
        Err(e) => {
            log::warn!("{e}; keeping {current}");
            current
        }
    }
}
