//! Client-side display filters for the frequency table.
//!
//! These narrow what the presentation layer shows; they never touch the
//! statistics engine's input, which is always the full cohort subset.

use crate::query::FrequencyRow;
use std::collections::BTreeSet;

/// User-entered display filters.
#[derive(Debug, Clone, Default)]
pub struct DisplayFilter {
    /// Substring match against `sample_id`; `None` or empty matches all.
    pub sample_contains: Option<String>,
    /// Selected population labels. `None` selects all; an empty set selects
    /// nothing (an empty table, not an error).
    pub populations: Option<BTreeSet<String>>,
}

impl DisplayFilter {
    /// True when no filtering is requested.
    pub fn is_pass_through(&self) -> bool {
        self.sample_contains.as_deref().unwrap_or("").is_empty() && self.populations.is_none()
    }

    fn keeps(&self, row: &FrequencyRow) -> bool {
        if let Some(needle) = self.sample_contains.as_deref() {
            if !needle.is_empty() && !row.sample_id.contains(needle) {
                return false;
            }
        }
        if let Some(selected) = &self.populations {
            if !selected.contains(&row.population) {
                return false;
            }
        }
        true
    }

    /// Apply the filters, preserving row order.
    pub fn apply(&self, rows: &[FrequencyRow]) -> Vec<FrequencyRow> {
        rows.iter().filter(|r| self.keeps(r)).cloned().collect()
    }
}

/// Distinct population labels in first-appearance order, for building the
/// multi-select options.
pub fn population_options(rows: &[FrequencyRow]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut options = Vec::new();
    for row in rows {
        if seen.insert(row.population.clone()) {
            options.push(row.population.clone());
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<FrequencyRow> {
        vec![
            FrequencyRow {
                sample_id: "smp_101".into(),
                population: "b_cell".into(),
                percentage: 12.0,
            },
            FrequencyRow {
                sample_id: "smp_101".into(),
                population: "nk_cell".into(),
                percentage: 8.0,
            },
            FrequencyRow {
                sample_id: "smp_202".into(),
                population: "b_cell".into(),
                percentage: 14.0,
            },
        ]
    }

    #[test]
    fn test_default_filter_passes_everything() {
        let filter = DisplayFilter::default();
        assert!(filter.is_pass_through());
        assert_eq!(filter.apply(&rows()).len(), 3);
    }

    #[test]
    fn test_substring_filters_sample_ids() {
        let filter = DisplayFilter {
            sample_contains: Some("101".into()),
            populations: None,
        };
        let kept = filter.apply(&rows());
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.sample_id == "smp_101"));
    }

    #[test]
    fn test_unmatched_substring_yields_empty_table() {
        let filter = DisplayFilter {
            sample_contains: Some("zzz".into()),
            populations: None,
        };
        assert!(filter.apply(&rows()).is_empty());
    }

    #[test]
    fn test_empty_selection_yields_empty_table() {
        let filter = DisplayFilter {
            sample_contains: None,
            populations: Some(BTreeSet::new()),
        };
        assert!(filter.apply(&rows()).is_empty());
    }

    #[test]
    fn test_population_selection() {
        let filter = DisplayFilter {
            sample_contains: None,
            populations: Some(["nk_cell".to_string()].into_iter().collect()),
        };
        let kept = filter.apply(&rows());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].population, "nk_cell");
    }

    #[test]
    fn test_population_options_first_appearance_order() {
        assert_eq!(population_options(&rows()), vec!["b_cell", "nk_cell"]);
    }
}
