//! Responder vs non-responder comparison, per cell population.
//!
//! Consumes the cohort frequency table (all timepoints) and tests each
//! population independently with the Mann-Whitney U test. Populations are
//! deliberately tested without multiple-comparisons correction; `significant`
//! reflects the raw p-value, preserving the behavior of the analysis this
//! tool reproduces.

pub mod mannwhitney;

use crate::error::Result;
use crate::query::CohortRow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use mannwhitney::{mann_whitney_u, MannWhitney};

/// Significance threshold applied to raw p-values.
pub const ALPHA: f64 = 0.05;

/// Three-valued significance flag.
///
/// `NotApplicable` marks populations where the test is undefined (one
/// response group empty); reported as a sentinel row, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    Yes,
    No,
    NotApplicable,
}

impl Significance {
    /// Classify a p-value: `Yes` iff p < [`ALPHA`], `NotApplicable` for NaN.
    pub fn from_p_value(p: f64) -> Self {
        if p.is_nan() {
            Self::NotApplicable
        } else if p < ALPHA {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::NotApplicable => "N/A",
        }
    }
}

/// Test outcome for one cell population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationTest {
    /// Cell population label.
    pub population: String,
    /// Mann-Whitney U statistic of the responder group (NaN when undefined).
    pub statistic: f64,
    /// Two-sided asymptotic p-value (NaN when undefined).
    pub p_value: f64,
    /// Significance at p < 0.05.
    pub significant: Significance,
}

/// Results for all populations, in first-appearance order of the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTestSet {
    /// Individual per-population results.
    pub results: Vec<PopulationTest>,
}

impl ResponseTestSet {
    /// Number of populations tested.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Populations significant at p < 0.05.
    pub fn significant_populations(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.significant == Significance::Yes)
            .map(|r| r.population.as_str())
            .collect()
    }

    /// Write results to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "population\tu_statistic\tp_value\tsignificant")?;
        for r in &self.results {
            writeln!(
                writer,
                "{}\t{:.4}\t{:.6}\t{}",
                r.population,
                r.statistic,
                r.p_value,
                r.significant.label()
            )?;
        }
        Ok(())
    }

    /// Serialize results to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.results)?)
    }

    /// Iterate over results.
    pub fn iter(&self) -> impl Iterator<Item = &PopulationTest> {
        self.results.iter()
    }
}

/// Run the responder comparison for every population in the cohort table.
///
/// Rows are grouped by population in the order each population first appears.
/// Within a population, percentages partition by response label ("yes" vs
/// "no"); rows with a NULL response register the population but join neither
/// group, so a population seen only in non-evaluable samples still gets its
/// sentinel row.
pub fn run_response_tests(rows: &[CohortRow]) -> ResponseTestSet {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (Vec<f64>, Vec<f64>)> = HashMap::new();

    for row in rows {
        let entry = groups.entry(row.population.clone()).or_insert_with(|| {
            order.push(row.population.clone());
            (Vec::new(), Vec::new())
        });
        match row.response.as_deref() {
            Some("yes") => entry.0.push(row.percentage),
            Some("no") => entry.1.push(row.percentage),
            _ => {}
        }
    }

    let results = order
        .into_iter()
        .map(|population| {
            let (responders, non_responders) = &groups[&population];
            let test = mann_whitney_u(responders, non_responders);
            PopulationTest {
                population,
                statistic: test.u,
                p_value: test.p_value,
                significant: Significance::from_p_value(test.p_value),
            }
        })
        .collect();

    ResponseTestSet { results }
}
