//! One-time CSV ingestion into the trial store.
//!
//! The source file is the wide-format `cell-count.csv` export: one row per
//! sample carrying the subject attributes and the five immune population
//! counts. Ingestion unpivots each row into five long-format `samples` rows,
//! deriving each population's relative frequency as `100 * count / total`.
//!
//! Ingestion happens exactly once, before any analytical query runs. A
//! failure here is fatal to the caller; there is no partial or degraded mode.

use crate::error::{CohortError, Result};
use crate::store::schema;
use rusqlite::{params, Connection, ErrorCode};
use serde::Deserialize;
use std::path::Path;

/// Immune cell populations measured per sample, in source-column order.
pub const POPULATIONS: [&str; 5] = ["b_cell", "cd8_t_cell", "cd4_t_cell", "nk_cell", "monocyte"];

/// One row of the wide-format source CSV.
///
/// Empty `treatment`/`response`/`time_from_treatment_start` fields map to
/// `None` (non-treated or non-evaluable samples).
#[derive(Debug, Deserialize)]
struct CellCountRecord {
    project: String,
    subject: String,
    condition: String,
    age: Option<i64>,
    sex: String,
    treatment: Option<String>,
    response: Option<String>,
    sample: String,
    sample_type: String,
    time_from_treatment_start: Option<f64>,
    b_cell: i64,
    cd8_t_cell: i64,
    cd4_t_cell: i64,
    nk_cell: i64,
    monocyte: i64,
}

impl CellCountRecord {
    fn counts(&self) -> [i64; 5] {
        [
            self.b_cell,
            self.cd8_t_cell,
            self.cd4_t_cell,
            self.nk_cell,
            self.monocyte,
        ]
    }
}

/// Counts of what an ingestion run wrote.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSummary {
    /// Distinct subjects inserted.
    pub subjects: usize,
    /// Samples (source rows) ingested.
    pub samples: usize,
    /// Long-format (sample, population) rows written.
    pub measurements: usize,
}

/// Create the schema and load the source CSV into `conn`.
///
/// Runs in a single transaction: either the whole file loads or nothing does.
pub fn init_and_load(conn: &mut Connection, source: &Path) -> Result<IngestSummary> {
    conn.execute_batch(schema::CREATE_SUBJECTS)?;
    conn.execute_batch(schema::CREATE_SAMPLES)?;
    conn.execute_batch(schema::CREATE_SAMPLE_SUBJECT_INDEX)?;

    let mut reader = csv::Reader::from_path(source)?;
    let tx = conn.transaction()?;
    let mut summary = IngestSummary::default();

    {
        let mut insert_subject = tx.prepare(
            "INSERT OR IGNORE INTO subjects (subject_id, condition, age, sex)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut insert_sample = tx.prepare(
            "INSERT INTO samples (sample_id, subject_id, project, treatment, response,
                                  sample_type, time_from_treatment_start, population,
                                  percentage, cell_count, total_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;

        for record in reader.deserialize() {
            let record: CellCountRecord = record?;
            let counts = record.counts();

            for (population, &count) in POPULATIONS.iter().zip(counts.iter()) {
                if count < 0 {
                    return Err(CohortError::InvalidCount {
                        sample: record.sample.clone(),
                        population: (*population).to_string(),
                        value: count.to_string(),
                    });
                }
            }
            let total: i64 = counts.iter().sum();

            let inserted = insert_subject.execute(params![
                record.subject,
                record.condition,
                record.age,
                record.sex,
            ])?;
            summary.subjects += inserted;

            for (population, &count) in POPULATIONS.iter().zip(counts.iter()) {
                // A zero-total sample has no meaningful relative frequencies;
                // store 0.0 rather than dividing by zero.
                let percentage = if total > 0 {
                    100.0 * count as f64 / total as f64
                } else {
                    0.0
                };
                insert_sample
                    .execute(params![
                        record.sample,
                        record.subject,
                        record.project,
                        record.treatment,
                        record.response,
                        record.sample_type,
                        record.time_from_treatment_start,
                        population,
                        percentage,
                        count,
                        total,
                    ])
                    .map_err(|e| duplicate_or_sqlite(e, &record.sample, population))?;
                summary.measurements += 1;
            }
            summary.samples += 1;
        }
    }

    tx.commit()?;

    if summary.samples == 0 {
        return Err(CohortError::EmptyData(format!(
            "no sample rows in {}",
            source.display()
        )));
    }
    Ok(summary)
}

fn duplicate_or_sqlite(e: rusqlite::Error, sample: &str, population: &str) -> CohortError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == ErrorCode::ConstraintViolation {
            return CohortError::DuplicateMeasurement {
                sample: sample.to_string(),
                population: population.to_string(),
            };
        }
    }
    CohortError::Sqlite(e)
}
