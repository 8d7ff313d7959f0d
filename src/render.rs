//! Text rendering for the dashboard and report entry points.
//!
//! Every section is a plain aligned-column table written to a `String`;
//! empty query results render a neutral placeholder line rather than
//! failing.

use crate::display::DisplayFilter;
use crate::error::Result;
use crate::explore::Explorer;
use crate::query::{BaselineSample, FrequencyRow, ProjectCount, ResponseCount, SexCount};
use crate::stats::ResponseTestSet;
use std::collections::BTreeSet;
use std::fmt::Write as _;

const EMPTY_TABLE: &str = "(no rows)";

/// Render an aligned-column table.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return format!("{EMPTY_TABLE}\n");
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }
    let mut out = String::new();
    for (i, header) in headers.iter().enumerate() {
        let _ = write!(out, "{:<width$}  ", header, width = widths[i]);
    }
    out.push('\n');
    for (i, _) in headers.iter().enumerate() {
        let _ = write!(out, "{}  ", "-".repeat(widths[i]));
    }
    out.push('\n');
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let _ = write!(out, "{:<width$}  ", cell, width = widths[i]);
        }
        out.push('\n');
    }
    out
}

fn response_label(response: &Option<String>) -> String {
    response.clone().unwrap_or_else(|| "unknown".to_string())
}

/// Frequency table section.
pub fn frequency_section(rows: &[FrequencyRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.sample_id.clone(),
                r.population.clone(),
                format!("{:.2}", r.percentage),
            ]
        })
        .collect();
    let distinct_samples: BTreeSet<&str> = rows.iter().map(|r| r.sample_id.as_str()).collect();
    let mut out = table(&["sample_id", "population", "percentage"], &cells);
    let _ = writeln!(
        out,
        "{} rows ({} samples)",
        rows.len(),
        distinct_samples.len()
    );
    out
}

/// Mann-Whitney results section.
pub fn stats_section(tests: &ResponseTestSet) -> String {
    let cells: Vec<Vec<String>> = tests
        .iter()
        .map(|t| {
            vec![
                t.population.clone(),
                format!("{:.1}", t.statistic),
                format!("{:.4}", t.p_value),
                t.significant.label().to_string(),
            ]
        })
        .collect();
    let mut out = table(
        &["population", "u_statistic", "p_value", "significant (p<0.05)"],
        &cells,
    );
    let significant = tests.significant_populations();
    if significant.is_empty() {
        out.push_str("No statistically significant differences found at p < 0.05.\n");
    } else {
        let _ = writeln!(
            out,
            "Significant difference detected in: {}",
            significant.join(", ")
        );
    }
    out
}

/// Baseline sample listing.
pub fn baseline_section(rows: &[BaselineSample]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.sample_id.clone(),
                r.subject_id.clone(),
                r.project.clone(),
                r.treatment.clone(),
                response_label(&r.response),
                r.sample_type.clone(),
                r.condition.clone(),
                r.sex.clone(),
            ]
        })
        .collect();
    table(
        &[
            "sample_id",
            "subject_id",
            "project",
            "treatment",
            "response",
            "sample_type",
            "condition",
            "sex",
        ],
        &cells,
    )
}

/// Samples-per-project breakdown.
pub fn project_section(rows: &[ProjectCount]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.project.clone(), r.sample_count.to_string()])
        .collect();
    table(&["project", "sample_count"], &cells)
}

/// Responder breakdown.
pub fn response_section(rows: &[ResponseCount]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![response_label(&r.response), r.subject_count.to_string()])
        .collect();
    table(&["response", "subject_count"], &cells)
}

/// Sex breakdown.
pub fn sex_section(rows: &[SexCount]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.sex.clone(), r.subject_count.to_string()])
        .collect();
    table(&["sex", "subject_count"], &cells)
}

/// The baseline subset report: four tables over one identical cohort.
/// Debug entry point, mirrored by the `report` subcommand.
pub fn subset_report(explorer: &mut Explorer) -> Result<String> {
    let filter = explorer.filter().clone();
    let baseline = explorer.baseline_samples()?;
    let projects = explorer.samples_per_project()?;
    let responses = explorer.response_breakdown()?;
    let sexes = explorer.sex_breakdown()?;

    let subjects: BTreeSet<&str> = baseline.iter().map(|r| r.subject_id.as_str()).collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== {} {} Baseline Samples ({}) ===",
        filter.condition, filter.sample_type, filter.treatment
    );
    let _ = writeln!(out, "Total samples: {}", baseline.len());
    let _ = writeln!(out, "Total unique subjects: {}\n", subjects.len());
    out.push_str(&baseline_section(&baseline));

    out.push_str("\n=== Samples per Project ===\n");
    out.push_str(&project_section(&projects));

    out.push_str("\n=== Responders vs Non-Responders (unique subjects) ===\n");
    out.push_str(&response_section(&responses));

    out.push_str("\n=== Sex Breakdown (unique subjects) ===\n");
    out.push_str(&sex_section(&sexes));

    Ok(out)
}

/// The full dashboard: frequency overview, responder statistics, and the
/// baseline subset section. Display filters narrow the frequency overview
/// only; the statistics input is always the unfiltered cohort.
pub fn dashboard(explorer: &mut Explorer, display: &DisplayFilter) -> Result<String> {
    let frequency = explorer.frequency_table()?;
    let shown = display.apply(&frequency);
    let tests = explorer.response_tests()?;
    let filter = explorer.filter().clone();

    let mut out = String::new();
    out.push_str("=== Cell Population Frequency Overview ===\n");
    out.push_str(&frequency_section(&shown));

    let _ = writeln!(
        out,
        "\n=== Responders vs Non-Responders ({}, {}, {} samples) ===",
        filter.condition, filter.treatment, filter.sample_type
    );
    out.push_str(&stats_section(&tests));

    out.push('\n');
    out.push_str(&subset_report(explorer)?);
    Ok(out)
}
