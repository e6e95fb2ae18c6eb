use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Filtered record table (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered records. Headers come from the first loaded record;
/// each row shows its value under the matching header, blank if absent.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    if !state.loaded {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spreadsheet to view records  (File → Open…)");
        });
        return;
    }

    ui.heading("Filtered Data");
    ui.separator();

    if state.columns.is_empty() {
        ui.label("The loaded file contains no records.");
        return;
    }
    if state.visible_indices.is_empty() {
        ui.weak("No records match the current filters.");
    }

    let records = state.store.all();
    let row_height = ui.text_style_height(&egui::TextStyle::Body) + 6.0;

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), state.columns.len())
            .header(row_height, |mut header| {
                for col in &state.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(row_height, state.visible_indices.len(), |mut row| {
                    let record = &records[state.visible_indices[row.index()]];
                    for col in &state.columns {
                        row.col(|ui: &mut Ui| {
                            let text = record.get(col).map(|v| v.to_string()).unwrap_or_default();
                            ui.label(text);
                        });
                    }
                });
            });
    });
}
