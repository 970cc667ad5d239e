use eframe::egui::{RichText, Ui};

use heart_dash::data::narrative::Narrative;
use heart_dash::data::summary::SummaryReport;

use crate::ui::labels;

// ---------------------------------------------------------------------------
// Metric cards and narrative
// ---------------------------------------------------------------------------

pub fn metric_row(ui: &mut Ui, report: &SummaryReport) {
    let cards = [
        ("Records", report.count.to_string()),
        ("Mean age", labels::metric(report.mean_age, " yrs")),
        ("Mean cholesterol", labels::metric(report.mean_cholesterol, " mg/dL")),
        ("Patients with disease", labels::metric(report.disease_prevalence_pct, " %")),
    ];
    ui.columns(cards.len(), |cols| {
        for (col, (title, value)) in cols.iter_mut().zip(cards) {
            col.group(|ui: &mut Ui| {
                ui.label(title);
                ui.label(RichText::new(value).size(22.0).strong());
            });
        }
    });
}

pub fn narrative(ui: &mut Ui, narrative: &Narrative) {
    ui.label(RichText::new(labels::headline(narrative.headline)).strong());
    for note in &narrative.notes {
        ui.label(format!("• {}", labels::note(*note)));
    }
}
