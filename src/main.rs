mod app;
mod color;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use serde::Serialize;

use app::HeartDashApp;
use heart_dash::config::DashboardConfig;
use heart_dash::data::export;
use heart_dash::data::filter::{apply, FilterCriteria};
use heart_dash::data::loader::load_file;
use heart_dash::data::narrative::{interpret, Narrative};
use heart_dash::data::summary::{summarize, SummaryReport};
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let config = DashboardConfig::parse();

    if config.headless {
        return run_headless(&config);
    }

    let mut state = AppState::new(config.clone());
    state.open_file(&config.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Heart Dash – Cardiac Records Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(HeartDashApp::new(state)))),
    )
    .map_err(|e| anyhow!("running dashboard: {e}"))
}

#[derive(Serialize)]
struct HeadlessReport<'a> {
    source: String,
    total_records: usize,
    criteria: &'a FilterCriteria,
    summary: &'a SummaryReport,
    narrative: &'a Narrative,
}

/// Load, filter once with the command-line criteria, print JSON.
fn run_headless(config: &DashboardConfig) -> Result<()> {
    let dataset = load_file(&config.data, &config.load_options())
        .with_context(|| format!("loading {}", config.data.display()))?;
    let criteria = config.criteria.to_criteria(&dataset)?;

    let view = apply(&dataset, &criteria);
    let summary = summarize(&view);
    let narrative = interpret(&summary, &criteria);

    if let Some(path) = &config.export {
        export::write_csv(&view, path)?;
    }

    let report = HeadlessReport {
        source: config.data.display().to_string(),
        total_records: dataset.len(),
        criteria: &criteria,
        summary: &summary,
        narrative: &narrative,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
