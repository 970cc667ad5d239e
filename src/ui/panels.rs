use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};
use egui_extras::DatePickerButton;

use heart_dash::data::filter::Choice;
use heart_dash::data::model::{ChestPain, Disease, Sex};

use crate::state::AppState;
use crate::ui::labels;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (Some(dataset), Some(criteria)) = (&state.dataset, &state.criteria) else {
        ui.label("No dataset loaded.");
        return;
    };

    // Copy what we need so we can mutate state below.
    let age_bounds = dataset.age_bounds();
    let date_bounds = dataset.date_bounds();
    let chest_pain_types = dataset.chest_pain_types().to_vec();
    let mut edited = criteria.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Sex");
            choice_combo(ui, "sex", &mut edited.sex, &[Sex::Male, Sex::Female], |s| {
                labels::sex(s).to_string()
            });
            ui.add_space(6.0);

            ui.strong("Heart disease");
            choice_combo(ui, "disease", &mut edited.disease, &[Disease::Present, Disease::Absent], |d| {
                labels::disease(d).to_string()
            });
            ui.add_space(6.0);

            ui.strong("Chest-pain type (cp)");
            choice_combo(ui, "cp", &mut edited.chest_pain, &chest_pain_types, labels::chest_pain);
            ui.separator();

            ui.strong("Age");
            let mut min_age = edited.age_range.start();
            let mut max_age = edited.age_range.end();
            let range = age_bounds.start()..=age_bounds.end();
            let min_changed = ui
                .add(Slider::new(&mut min_age, range.clone()).text("min"))
                .changed();
            let max_changed = ui.add(Slider::new(&mut max_age, range).text("max")).changed();

            if let Some(bounds) = date_bounds {
                ui.separator();
                ui.strong("Exam date");
                let current = edited.date_range.unwrap_or(bounds);
                let mut start = current.start();
                let mut end = current.end();
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("from");
                    ui.add(DatePickerButton::new(&mut start).id_salt("date_from"));
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("to");
                    ui.add(DatePickerButton::new(&mut end).id_salt("date_to"));
                });
                if start != current.start() {
                    state.set_date_start(bounds.clamp(start));
                }
                if end != current.end() {
                    state.set_date_end(bounds.clamp(end));
                }
            }

            if min_changed {
                state.set_age_min(min_age);
            }
            if max_changed {
                state.set_age_max(max_age);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
                return;
            }

            // Categorical selections are plain assignments.
            let categorical_changed = state.criteria.as_ref().is_some_and(|c| {
                c.sex != edited.sex || c.disease != edited.disease || c.chest_pain != edited.chest_pain
            });
            if categorical_changed {
                state.update_criteria(|c| {
                    c.sex = edited.sex;
                    c.disease = edited.disease;
                    c.chest_pain = edited.chest_pain;
                });
            }
        });
}

fn choice_combo<T: Copy + PartialEq>(
    ui: &mut Ui,
    id: &str,
    current: &mut Choice<T>,
    options: &[T],
    label: impl Fn(T) -> String,
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(labels::choice(current, &label))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(current, Choice::Any, "All");
            for &opt in options {
                ui.selectable_value(current, Choice::Only(opt), label(opt));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.derived.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(derived)) = (&state.dataset, &state.derived) {
            ui.label(format!(
                "{} records loaded, {} matching",
                ds.len(),
                derived.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open patient records")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(&state.config.export_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    match state.export_to(&path) {
        Ok(rows) => {
            state.status_message = Some(format!("Exported {rows} records to {}", path.display()));
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
