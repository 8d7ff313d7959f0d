//! Fixed analytical queries over the trial store.
//!
//! Six read operations, each a pure function of store state returning a flat
//! row vector. Nothing here mutates the store.
//!
//! Operations 3-6 (`baseline_samples` through `sex_breakdown`) share the
//! [`BASELINE_WHERE`] fragment, so the per-project, per-response, and per-sex
//! breakdowns are always computed over the identical cohort as the baseline
//! sample listing. That is a correctness invariant: the four tables describe
//! one cohort, and drifting predicates would silently break that.

use crate::error::Result;
use crate::store::Store;
use rusqlite::params;
use serde::{Deserialize, Serialize};

/// Cohort selection predicates shared by the filtered queries.
///
/// Defaults match the trial question under study: melanoma subjects, PBMC
/// samples, miraclib treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFilter {
    /// Subject diagnosis, e.g. "melanoma".
    pub condition: String,
    /// Sample material, e.g. "PBMC".
    pub sample_type: String,
    /// Treatment arm, e.g. "miraclib".
    pub treatment: String,
}

impl Default for CohortFilter {
    fn default() -> Self {
        Self {
            condition: "melanoma".to_string(),
            sample_type: "PBMC".to_string(),
            treatment: "miraclib".to_string(),
        }
    }
}

impl CohortFilter {
    /// Stable fingerprint of the predicates, used in memoization keys.
    pub fn fingerprint(&self) -> String {
        format!("{}|{}|{}", self.condition, self.sample_type, self.treatment)
    }
}

/// Join + filter fragment selecting the cohort across all timepoints.
const COHORT_WHERE: &str = "FROM samples s
JOIN subjects sub ON s.subject_id = sub.subject_id
WHERE sub.condition = ?1
  AND s.sample_type = ?2
  AND s.treatment = ?3";

/// Cohort fragment further restricted to baseline (time = 0). Every
/// baseline breakdown query must be built from this exact fragment.
const BASELINE_WHERE: &str = "FROM samples s
JOIN subjects sub ON s.subject_id = sub.subject_id
WHERE sub.condition = ?1
  AND s.sample_type = ?2
  AND s.treatment = ?3
  AND s.time_from_treatment_start = 0";

/// One (sample, population) relative-frequency measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub sample_id: String,
    pub population: String,
    pub percentage: f64,
}

/// A cohort measurement with the responder label attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    pub sample_id: String,
    pub population: String,
    pub percentage: f64,
    /// "yes" / "no", or `None` for non-evaluable samples.
    pub response: Option<String>,
}

/// A baseline sample with its subject attributes attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSample {
    pub sample_id: String,
    pub subject_id: String,
    pub project: String,
    pub treatment: String,
    pub response: Option<String>,
    pub sample_type: String,
    pub time_from_treatment_start: f64,
    pub condition: String,
    pub sex: String,
}

/// Baseline sample count for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCount {
    pub project: String,
    pub sample_count: i64,
}

/// Distinct-subject count for one response label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCount {
    /// `None` groups the non-evaluable subjects.
    pub response: Option<String>,
    pub subject_count: i64,
}

/// Distinct-subject count for one sex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexCount {
    pub sex: String,
    pub subject_count: i64,
}

/// Operation 1: every (sample, population, percentage) row, unfiltered.
pub fn frequency_table(store: &Store) -> Result<Vec<FrequencyRow>> {
    let mut stmt = store.conn().prepare(
        "SELECT sample_id, population, percentage
         FROM samples
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(FrequencyRow {
                sample_id: row.get(0)?,
                population: row.get(1)?,
                percentage: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Operation 2: the cohort subset across all timepoints, with response labels.
///
/// This is the statistics engine's input. Row order follows ingestion order,
/// so populations appear in a stable first-seen order downstream.
pub fn cohort_frequency(store: &Store, filter: &CohortFilter) -> Result<Vec<CohortRow>> {
    let sql = format!(
        "SELECT s.sample_id, s.population, s.percentage, s.response
         {COHORT_WHERE}
         ORDER BY s.rowid"
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filter.condition, filter.sample_type, filter.treatment],
            |row| {
                Ok(CohortRow {
                    sample_id: row.get(0)?,
                    population: row.get(1)?,
                    percentage: row.get(2)?,
                    response: row.get(3)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Operation 3: baseline cohort, one row per sample with subject attributes.
///
/// The samples table is long-format (one row per population), so sample-level
/// rows are projected with DISTINCT over the sample-level columns only.
pub fn baseline_samples(store: &Store, filter: &CohortFilter) -> Result<Vec<BaselineSample>> {
    let sql = format!(
        "SELECT DISTINCT s.sample_id, s.subject_id, s.project, s.treatment, s.response,
                s.sample_type, s.time_from_treatment_start, sub.condition, sub.sex
         {BASELINE_WHERE}
         ORDER BY s.sample_id"
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filter.condition, filter.sample_type, filter.treatment],
            |row| {
                Ok(BaselineSample {
                    sample_id: row.get(0)?,
                    subject_id: row.get(1)?,
                    project: row.get(2)?,
                    treatment: row.get(3)?,
                    response: row.get(4)?,
                    sample_type: row.get(5)?,
                    time_from_treatment_start: row.get(6)?,
                    condition: row.get(7)?,
                    sex: row.get(8)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Operation 4: baseline cohort sample counts per project, ascending by name.
pub fn samples_per_project(store: &Store, filter: &CohortFilter) -> Result<Vec<ProjectCount>> {
    let sql = format!(
        "SELECT s.project, COUNT(DISTINCT s.sample_id) AS sample_count
         {BASELINE_WHERE}
         GROUP BY s.project
         ORDER BY s.project"
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filter.condition, filter.sample_type, filter.treatment],
            |row| {
                Ok(ProjectCount {
                    project: row.get(0)?,
                    sample_count: row.get(1)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Operation 5: baseline cohort distinct-subject counts per response label.
///
/// Counts subjects, not samples: a subject with several baseline samples
/// contributes exactly one. A NULL response forms its own group, so the
/// result may have fewer than two rows, or an unexpected third one.
pub fn response_breakdown(store: &Store, filter: &CohortFilter) -> Result<Vec<ResponseCount>> {
    let sql = format!(
        "SELECT s.response, COUNT(DISTINCT s.subject_id) AS subject_count
         {BASELINE_WHERE}
         GROUP BY s.response
         ORDER BY s.response"
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filter.condition, filter.sample_type, filter.treatment],
            |row| {
                Ok(ResponseCount {
                    response: row.get(0)?,
                    subject_count: row.get(1)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Operation 6: baseline cohort distinct-subject counts per sex.
pub fn sex_breakdown(store: &Store, filter: &CohortFilter) -> Result<Vec<SexCount>> {
    let sql = format!(
        "SELECT sub.sex, COUNT(DISTINCT s.subject_id) AS subject_count
         {BASELINE_WHERE}
         GROUP BY sub.sex
         ORDER BY sub.sex"
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filter.condition, filter.sample_type, filter.treatment],
            |row| {
                Ok(SexCount {
                    sex: row.get(0)?,
                    subject_count: row.get(1)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
