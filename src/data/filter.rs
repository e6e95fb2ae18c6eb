use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::model::Record;

// ---------------------------------------------------------------------------
// Filter fields: the four filterable attributes
// ---------------------------------------------------------------------------

/// One of the four user-editable filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    CancerTypes,
    SideEffects,
    TreatmentCategories,
    PrescriptionOptions,
}

/// How a field's accepted values are compared against a record's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Any accepted value occurs as a substring of the cell text.
    Contains,
    /// The cell text equals one of the accepted values.
    Exact,
}

impl FilterField {
    /// All fields, in the order the inputs are shown.
    pub const ALL: [FilterField; 4] = [
        FilterField::CancerTypes,
        FilterField::SideEffects,
        FilterField::TreatmentCategories,
        FilterField::PrescriptionOptions,
    ];

    /// The record attribute this field is matched against.
    pub fn column(self) -> &'static str {
        match self {
            FilterField::CancerTypes => "Cancer type related",
            FilterField::SideEffects => "Adverse Event",
            FilterField::TreatmentCategories => "AE category related",
            FilterField::PrescriptionOptions => "Prescription/OTC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterField::CancerTypes => "Cancer Types",
            FilterField::SideEffects => "Side Effects",
            FilterField::TreatmentCategories => "Treatment Categories",
            FilterField::PrescriptionOptions => "Prescription/OTC",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterField::CancerTypes => "cancerTypes",
            FilterField::SideEffects => "sideEffects",
            FilterField::TreatmentCategories => "treatmentCategories",
            FilterField::PrescriptionOptions => "prescriptionOptions",
        }
    }

    /// Values a click can add to this field's input, taken from one cell.
    ///
    /// Input is split on `,`, so a cell holding a comma cannot be offered
    /// whole. Substring fields offer each untrimmed fragment; exact fields
    /// offer nothing for such a cell.
    pub fn suggestions_from(self, text: &str) -> Vec<&str> {
        match self.match_rule() {
            MatchRule::Contains => text.split(',').filter(|f| !f.is_empty()).collect(),
            MatchRule::Exact if text.is_empty() || text.contains(',') => Vec::new(),
            MatchRule::Exact => vec![text],
        }
    }

    pub fn match_rule(self) -> MatchRule {
        // Cancer-type cells hold free text listing several cancers.
        match self {
            FilterField::CancerTypes => MatchRule::Contains,
            _ => MatchRule::Exact,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter field '{0}'")]
pub struct ParseFilterFieldError(pub String);

impl FromStr for FilterField {
    type Err = ParseFilterFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ParseFilterFieldError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Filter criteria: accepted values per field
// ---------------------------------------------------------------------------

/// Accepted values for each field. An empty set means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub cancer_types: BTreeSet<String>,
    pub side_effects: BTreeSet<String>,
    pub treatment_categories: BTreeSet<String>,
    pub prescription_options: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn get(&self, field: FilterField) -> &BTreeSet<String> {
        match field {
            FilterField::CancerTypes => &self.cancer_types,
            FilterField::SideEffects => &self.side_effects,
            FilterField::TreatmentCategories => &self.treatment_categories,
            FilterField::PrescriptionOptions => &self.prescription_options,
        }
    }

    fn get_mut(&mut self, field: FilterField) -> &mut BTreeSet<String> {
        match field {
            FilterField::CancerTypes => &mut self.cancer_types,
            FilterField::SideEffects => &mut self.side_effects,
            FilterField::TreatmentCategories => &mut self.treatment_categories,
            FilterField::PrescriptionOptions => &mut self.prescription_options,
        }
    }

    /// True when every field is empty, i.e. every record passes.
    pub fn is_unconstrained(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Whether `record` satisfies all four predicates.
    ///
    /// A field with no accepted values always passes. Otherwise the record
    /// fails when the column is absent or does not hold text.
    pub fn matches(&self, record: &Record) -> bool {
        FilterField::ALL.iter().all(|&field| {
            let accepted = self.get(field);
            if accepted.is_empty() {
                return true;
            }
            let Some(text) = record.get(field.column()).and_then(|v| v.as_text()) else {
                return false;
            };
            match field.match_rule() {
                MatchRule::Contains => accepted.iter().any(|a| text.contains(a.as_str())),
                MatchRule::Exact => accepted.contains(text),
            }
        })
    }
}

/// Split raw input on `,` without trimming. Empty input is the empty set.
pub fn parse_criterion(raw: &str) -> BTreeSet<String> {
    if raw.is_empty() {
        return BTreeSet::new();
    }
    raw.split(',').map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Holds the current criteria and evaluates them over a record list.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    criteria: FilterCriteria,
}

impl FilterEngine {
    /// Replace one field's accepted values from comma-separated input.
    /// The other three fields are untouched.
    pub fn set_criterion(&mut self, field: FilterField, raw: &str) {
        let values = parse_criterion(raw);
        log::debug!("filter {field} set to {values:?}");
        *self.criteria.get_mut(field) = values;
    }

    /// Reset every field to "no constraint".
    pub fn clear(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Records passing all active filters, in their original order.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records
            .iter()
            .filter(|r| self.criteria.matches(r))
            .collect()
    }

    /// Positions of the records [`apply`](Self::apply) would return.
    pub fn filtered_indices(&self, records: &[Record]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.criteria.matches(r))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn row(cancer: &str, ae: &str, category: &str, rx: &str) -> Record {
        [
            ("Drug", CellValue::from("Drug X")),
            ("Cancer type related", CellValue::from(cancer)),
            ("Adverse Event", CellValue::from(ae)),
            ("AE category related", CellValue::from(category)),
            ("Prescription/OTC", CellValue::from(rx)),
        ]
        .into_iter()
        .collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            row("Breast", "Nausea", "Chemo", "OTC"),
            row("Lung", "Nausea", "Chemo", "Rx"),
            row("Breast, Ovarian", "Fatigue", "Hormonal", "Rx"),
            row("Colorectal", "Rash", "Targeted", "OTC"),
        ]
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unconstrained_criteria_return_everything() {
        let records = sample();
        let engine = FilterEngine::default();
        assert!(engine.criteria().is_unconstrained());
        let out: Vec<Record> = engine.apply(&records).into_iter().cloned().collect();
        assert_eq!(out, records);
    }

    #[test]
    fn cancer_types_match_on_substring() {
        let records = sample();
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::CancerTypes, "Ovar");
        assert_eq!(engine.filtered_indices(&records), vec![2]);

        engine.set_criterion(FilterField::CancerTypes, "Breast,Lung");
        assert_eq!(engine.filtered_indices(&records), vec![0, 1, 2]);
    }

    #[test]
    fn side_effects_match_exactly() {
        let records = sample();
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::SideEffects, "Naus");
        assert!(engine.apply(&records).is_empty());

        engine.set_criterion(FilterField::SideEffects, "Nausea,Rash");
        assert_eq!(engine.filtered_indices(&records), vec![0, 1, 3]);
    }

    #[test]
    fn category_and_prescription_match_exactly() {
        let records = sample();
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::TreatmentCategories, "Chemo");
        assert_eq!(engine.filtered_indices(&records), vec![0, 1]);

        engine.set_criterion(FilterField::TreatmentCategories, "");
        engine.set_criterion(FilterField::PrescriptionOptions, "OTC");
        assert_eq!(engine.filtered_indices(&records), vec![0, 3]);

        engine.set_criterion(FilterField::PrescriptionOptions, "otc");
        assert!(engine.filtered_indices(&records).is_empty());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let records = sample();
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::CancerTypes, "Breast");
        engine.set_criterion(FilterField::PrescriptionOptions, "Rx");
        assert_eq!(engine.filtered_indices(&records), vec![2]);
    }

    #[test]
    fn end_to_end_nausea_then_otc() {
        let records = vec![
            row("Breast", "Nausea", "Chemo", "OTC"),
            row("Lung", "Nausea", "Chemo", "Rx"),
        ];
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::SideEffects, "Nausea");
        assert_eq!(engine.apply(&records).len(), 2);

        engine.set_criterion(FilterField::PrescriptionOptions, "OTC");
        let out = engine.apply(&records);
        assert_eq!(out, vec![&records[0]]);
    }

    #[test]
    fn empty_input_resets_field() {
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::SideEffects, "Nausea,Rash");
        engine.set_criterion(FilterField::SideEffects, "");
        assert!(engine.criteria().side_effects.is_empty());
        assert!(engine.criteria().is_unconstrained());
    }

    #[test]
    fn split_keeps_whitespace() {
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::SideEffects, "a, b ,c");
        assert_eq!(engine.criteria().side_effects, set(&["a", " b ", "c"]));

        let records = vec![row("Lung", "b", "Chemo", "Rx")];
        assert!(engine.apply(&records).is_empty());
    }

    #[test]
    fn set_criterion_leaves_other_fields_untouched() {
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::CancerTypes, "Lung");
        engine.set_criterion(FilterField::PrescriptionOptions, "OTC,Rx");
        engine.set_criterion(FilterField::SideEffects, "Nausea");

        let c = engine.criteria();
        assert_eq!(c.cancer_types, set(&["Lung"]));
        assert_eq!(c.prescription_options, set(&["OTC", "Rx"]));
        assert_eq!(c.side_effects, set(&["Nausea"]));
        assert!(c.treatment_categories.is_empty());
    }

    #[test]
    fn trailing_comma_accepts_empty_string() {
        let records = sample();
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::CancerTypes, "Lung,");
        assert_eq!(engine.criteria().cancer_types, set(&["Lung", ""]));
        // The empty string is a substring of every cancer-type cell.
        assert_eq!(engine.filtered_indices(&records), vec![0, 1, 2, 3]);
    }

    #[test]
    fn missing_or_non_text_column_excludes_record() {
        let full = row("Lung", "Nausea", "Chemo", "OTC");
        let no_rx: Record = full
            .iter()
            .filter(|(k, _)| *k != "Prescription/OTC")
            .map(|(k, v)| (k, v.clone()))
            .collect();
        let mut numeric = row("Lung", "Nausea", "Chemo", "OTC");
        numeric.insert("Cancer type related", CellValue::Integer(1));
        let records = vec![no_rx, numeric];

        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::PrescriptionOptions, "OTC");
        assert_eq!(engine.filtered_indices(&records), vec![1]);

        engine.set_criterion(FilterField::PrescriptionOptions, "");
        engine.set_criterion(FilterField::CancerTypes, "1");
        assert!(engine.filtered_indices(&records).is_empty());
        engine.set_criterion(FilterField::CancerTypes, "Lung");
        assert_eq!(engine.filtered_indices(&records), vec![0]);
    }

    #[test]
    fn missing_column_is_ignored_while_field_is_empty() {
        let records = vec![Record::new()];
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::CancerTypes, "");
        assert_eq!(engine.apply(&records).len(), 1);
    }

    #[test]
    fn apply_is_idempotent() {
        let records = sample();
        let mut engine = FilterEngine::default();
        engine.set_criterion(FilterField::CancerTypes, "Breast");
        let first = engine.apply(&records);
        let second = engine.apply(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn clear_drops_all_criteria() {
        let mut engine = FilterEngine::default();
        for field in FilterField::ALL {
            engine.set_criterion(field, "x");
        }
        engine.clear();
        assert!(engine.criteria().is_unconstrained());
    }

    #[test]
    fn suggestions_never_contain_the_delimiter() {
        assert_eq!(
            FilterField::CancerTypes.suggestions_from("Breast, Lung,,Colorectal"),
            vec!["Breast", " Lung", "Colorectal"]
        );
        assert!(FilterField::SideEffects
            .suggestions_from("Nausea, vomiting")
            .is_empty());
        assert_eq!(FilterField::SideEffects.suggestions_from("Rash"), vec!["Rash"]);
        assert!(FilterField::PrescriptionOptions.suggestions_from("").is_empty());
    }

    #[test]
    fn field_names_parse_back() {
        for field in FilterField::ALL {
            assert_eq!(field.name().parse::<FilterField>(), Ok(field));
        }
        assert_eq!(
            "dosage".parse::<FilterField>(),
            Err(ParseFilterFieldError("dosage".into()))
        );
        assert_eq!(FilterField::SideEffects.column(), "Adverse Event");
        assert_eq!(FilterField::CancerTypes.match_rule(), MatchRule::Contains);
        assert_eq!(FilterField::PrescriptionOptions.match_rule(), MatchRule::Exact);
    }
}
