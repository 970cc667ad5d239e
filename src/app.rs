use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{metrics, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HeartDashApp {
    pub state: AppState,
}

impl HeartDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for HeartDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(derived)) = (&state.dataset, &state.derived) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore patient records  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Cardiac dashboard");
            metrics::metric_row(ui, &derived.report);
            ui.add_space(6.0);
            metrics::narrative(ui, &derived.narrative);
            ui.separator();

            plot::charts(ui, &derived.charts, &state.disease_colors);
            ui.separator();

            ui.strong("Filtered records");
            table::data_table(ui, dataset, &derived.visible_indices);
        });
}
