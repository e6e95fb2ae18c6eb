use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::data::export::export_file;
use crate::data::filter::{FilterEngine, FilterField};
use crate::data::loader::load_file;
use crate::data::model::{Record, RecordStore};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Records of the last successful load.
    pub store: RecordStore,

    /// Current filter criteria.
    pub engine: FilterEngine,

    /// Raw text of each filter input, as typed.
    pub filter_inputs: BTreeMap<FilterField, String>,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Header names, taken from the first record.
    pub columns: Vec<String>,

    /// Clickable values per filter field, derived from its column (cached per load).
    pub suggestions: BTreeMap<FilterField, BTreeSet<String>>,

    /// Whether any file has been loaded yet.
    pub loaded: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Replace the store with freshly decoded records and re-apply filters.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.store.load(records);
        self.columns = self.store.columns();
        self.suggestions = FilterField::ALL
            .into_iter()
            .map(|f| {
                let values = self.store.distinct_text_values(f.column());
                let offered: BTreeSet<String> = values
                    .iter()
                    .flat_map(|text| f.suggestions_from(text))
                    .map(str::to_string)
                    .collect();
                (f, offered)
            })
            .collect();
        self.loaded = true;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after a store or criteria change.
    pub fn refilter(&mut self) {
        self.visible_indices = self.engine.filtered_indices(self.store.all());
        log::debug!(
            "{} of {} records visible",
            self.visible_indices.len(),
            self.store.len()
        );
    }

    /// Raw input text for one filter field.
    pub fn input(&self, field: FilterField) -> &str {
        self.filter_inputs.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Store the raw text for `field` and re-apply the filters.
    pub fn set_filter_input(&mut self, field: FilterField, raw: String) {
        self.engine.set_criterion(field, &raw);
        self.filter_inputs.insert(field, raw);
        self.refilter();
    }

    /// Whether `value` is one of the field's accepted values.
    pub fn is_selected(&self, field: FilterField, value: &str) -> bool {
        self.engine.criteria().get(field).contains(value)
    }

    /// Append `value` to a field's comma-separated input. Values already
    /// accepted, or holding the `,` delimiter, are ignored.
    pub fn add_filter_value(&mut self, field: FilterField, value: &str) {
        if value.contains(',') || self.is_selected(field, value) {
            log::debug!("not adding {value:?} to {field}");
            return;
        }
        let current = self.input(field);
        let raw = if current.is_empty() {
            value.to_string()
        } else {
            format!("{current},{value}")
        };
        self.set_filter_input(field, raw);
    }

    /// Empty every filter input.
    pub fn clear_filters(&mut self) {
        self.engine.clear();
        self.filter_inputs.clear();
        self.refilter();
    }

    /// Records currently passing the filters, in load order.
    pub fn visible_records(&self) -> Vec<&Record> {
        let all = self.store.all();
        self.visible_indices.iter().map(|&i| &all[i]).collect()
    }

    /// Decode `path` and replace the store. On failure the store is kept.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path) {
            Ok(records) => {
                let columns = records
                    .first()
                    .map(|r| r.keys().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                log::info!(
                    "Loaded {} records from {} with columns [{columns}]",
                    records.len(),
                    path.display()
                );
                self.set_records(records);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Write the visible records to `path`.
    pub fn export_visible(&mut self, path: &Path) {
        let rows = self.visible_records();
        let result = export_file(path, &self.columns, &rows).map(|()| rows.len());
        match result {
            Ok(n) => {
                log::info!("Exported {n} records to {}", path.display());
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn row(cancer: &str, ae: &str, rx: &str) -> Record {
        [
            ("Cancer type related", CellValue::from(cancer)),
            ("Adverse Event", CellValue::from(ae)),
            ("Prescription/OTC", CellValue::from(rx)),
        ]
        .into_iter()
        .collect()
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_records(vec![
            row("Breast", "Nausea", "OTC"),
            row("Lung", "Nausea", "Rx"),
            row("Lung", "Rash", "OTC"),
        ]);
        state
    }

    #[test]
    fn loading_shows_every_record() {
        let state = loaded();
        assert!(state.loaded);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(
            state.columns,
            vec!["Cancer type related", "Adverse Event", "Prescription/OTC"]
        );
    }

    #[test]
    fn reload_keeps_criteria_and_refilters() {
        let mut state = loaded();
        state.set_filter_input(FilterField::PrescriptionOptions, "OTC".into());
        assert_eq!(state.visible_indices, vec![0, 2]);

        state.set_records(vec![row("Skin", "Itch", "Rx"), row("Skin", "Itch", "OTC")]);
        assert_eq!(state.visible_indices, vec![1]);
    }

    #[test]
    fn suggestions_list_distinct_values_per_field() {
        let state = loaded();
        let side_effects: Vec<_> = state.suggestions[&FilterField::SideEffects]
            .iter()
            .cloned()
            .collect();
        assert_eq!(side_effects, vec!["Nausea", "Rash"]);
        assert!(state.suggestions[&FilterField::TreatmentCategories].is_empty());
    }

    #[test]
    fn suggestions_append_to_input() {
        let mut state = loaded();
        state.add_filter_value(FilterField::SideEffects, "Rash");
        assert_eq!(state.input(FilterField::SideEffects), "Rash");
        state.add_filter_value(FilterField::SideEffects, "Nausea");
        assert_eq!(state.input(FilterField::SideEffects), "Rash,Nausea");
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn comma_separated_cells_are_offered_as_selectable_values() {
        let mut state = AppState::default();
        state.set_records(vec![
            row("Breast, Lung, Colorectal", "Nausea, vomiting", "Rx"),
            row("Melanoma, Lung", "Rash", "Rx"),
        ]);

        let cancers: Vec<_> = state.suggestions[&FilterField::CancerTypes]
            .iter()
            .cloned()
            .collect();
        assert_eq!(cancers, vec![" Colorectal", " Lung", "Breast", "Melanoma"]);
        let side_effects: Vec<_> = state.suggestions[&FilterField::SideEffects]
            .iter()
            .cloned()
            .collect();
        assert_eq!(side_effects, vec!["Rash"]);

        state.add_filter_value(FilterField::CancerTypes, "Breast");
        assert_eq!(state.visible_indices, vec![0]);
        assert!(state.is_selected(FilterField::CancerTypes, "Breast"));

        // A second click does not append a duplicate.
        state.add_filter_value(FilterField::CancerTypes, "Breast");
        assert_eq!(state.input(FilterField::CancerTypes), "Breast");

        // A whole comma-holding cell cannot be expressed as input.
        state.add_filter_value(FilterField::SideEffects, "Nausea, vomiting");
        assert_eq!(state.input(FilterField::SideEffects), "");
        assert_eq!(state.visible_indices, vec![0]);

        state.add_filter_value(FilterField::CancerTypes, " Lung");
        assert_eq!(state.input(FilterField::CancerTypes), "Breast, Lung");
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn clearing_filters_restores_full_view() {
        let mut state = loaded();
        state.set_filter_input(FilterField::CancerTypes, "Lung".into());
        state.set_filter_input(FilterField::SideEffects, "Rash".into());
        assert_eq!(state.visible_indices, vec![2]);

        state.clear_filters();
        assert_eq!(state.input(FilterField::CancerTypes), "");
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn failed_open_keeps_current_records() {
        let mut state = loaded();
        state.open_file(Path::new("does-not-exist.xlsx"));
        assert_eq!(state.store.len(), 3);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn visible_records_follow_indices() {
        let mut state = loaded();
        state.set_filter_input(FilterField::SideEffects, "Nausea".into());
        let visible = state.visible_records();
        assert_eq!(visible.len(), 2);
        assert_eq!(
            visible[1].get("Cancer type related"),
            Some(&CellValue::from("Lung"))
        );
    }
}
