//! SQLite schema for the trial store.
//!
//! Two tables, written once at ingestion and read-only afterwards. The
//! `samples` table is long-format: one row per (sample, population) pair,
//! with the sample-level attributes repeated on every population row. The
//! composite primary key enforces the at-most-once invariant for each
//! (sample, population) measurement.

/// DDL for the `subjects` table.
pub const CREATE_SUBJECTS: &str = "
CREATE TABLE IF NOT EXISTS subjects (
    subject_id TEXT PRIMARY KEY,
    condition  TEXT NOT NULL,
    age        INTEGER,
    sex        TEXT NOT NULL
);
";

/// DDL for the `samples` table.
pub const CREATE_SAMPLES: &str = "
CREATE TABLE IF NOT EXISTS samples (
    sample_id                 TEXT NOT NULL,
    subject_id                TEXT NOT NULL REFERENCES subjects(subject_id),
    project                   TEXT NOT NULL,
    treatment                 TEXT,
    response                  TEXT,
    sample_type               TEXT NOT NULL,
    time_from_treatment_start REAL,
    population                TEXT NOT NULL,
    percentage                REAL NOT NULL,
    cell_count                INTEGER NOT NULL,
    total_count               INTEGER NOT NULL,
    PRIMARY KEY (sample_id, population)
);
";

/// Index supporting the subject join used by every cohort query.
pub const CREATE_SAMPLE_SUBJECT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_samples_subject ON samples(subject_id);";
