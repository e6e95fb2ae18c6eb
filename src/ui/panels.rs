use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::FilterField;
use crate::data::loader::SUPPORTED_EXTENSIONS;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter inputs
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for field in FilterField::ALL {
                ui.strong(field.label());

                let mut text = state.input(field).to_string();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut text)
                        .hint_text("Enter comma-separated values")
                        .desired_width(f32::INFINITY),
                );
                if response.changed() {
                    state.set_filter_input(field, text);
                }

                if state.loaded {
                    suggestion_list(ui, state, field);
                }
                ui.add_space(8.0);
            }
        });
}

/// Collapsible list of the values seen in `field`'s column. Clicking one
/// appends it to the field's input.
fn suggestion_list(ui: &mut Ui, state: &mut AppState, field: FilterField) {
    // Clone so we can mutate state inside the loop.
    let values = state.suggestions.get(&field).cloned().unwrap_or_default();

    egui::CollapsingHeader::new(format!("{}  ({})", field.column(), values.len()))
        .id_salt(field.name())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if values.is_empty() {
                ui.weak("No text values in this column.");
            }
            for value in &values {
                let selected = state.is_selected(field, value);
                if ui.selectable_label(selected, value.as_str()).clicked() && !selected {
                    state.add_filter_value(field, value);
                }
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
            if ui
                .add_enabled(state.loaded, egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loaded {
            ui.label(format!(
                "{} records loaded, {} visible",
                state.store.len(),
                state.visible_indices.len()
            ));
            ui.separator();
        }

        let filtering = !state.engine.criteria().is_unconstrained();
        if ui
            .add_enabled(filtering, egui::Button::new("Clear filters"))
            .clicked()
        {
            state.clear_filters();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open adverse-event spreadsheet")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
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
        .set_title("Export filtered records")
        .set_file_name("filtered.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        state.export_visible(&path);
    }
}
