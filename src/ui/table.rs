use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use heart_dash::data::export::format_cell;
use heart_dash::data::model::Dataset;

/// Filtered records as a scrollable table, cells formatted as on export.
pub fn data_table(ui: &mut Ui, dataset: &Dataset, visible: &[usize]) {
    let columns = dataset.columns();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(48.0), columns.len())
        .max_scroll_height(320.0)
        .header(20.0, |mut header| {
            for col in columns {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, visible.len(), |mut row| {
                let index = visible[row.index()];
                for col in columns {
                    row.col(|ui| {
                        ui.label(format_cell(dataset, index, col));
                    });
                }
            });
        });
}
