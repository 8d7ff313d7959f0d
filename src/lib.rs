//! Clinical-trial immune cell population explorer.
//!
//! Loads immune-cell population measurements and subject metadata into a
//! SQLite store, answers a fixed set of analytical queries over it, compares
//! treatment responders against non-responders per cell population with the
//! Mann-Whitney U test, and renders the results as text dashboards.
//!
//! # Overview
//!
//! The library is organized leaf-first:
//!
//! - **store**: SQLite context object, schema, and one-time CSV ingestion
//! - **query**: six fixed read operations over subjects and samples
//! - **stats**: per-population responder comparison (Mann-Whitney U)
//! - **cache**: bounded memoization keyed by (operation, params, generation)
//! - **explore**: memoized session facade over queries and statistics
//! - **display**: client-side filters for the frequency overview
//! - **render**: text-table output for the dashboard and report
//!
//! # Example
//!
//! ```no_run
//! use immunocohort::prelude::*;
//! use std::path::Path;
//!
//! let (store, _) = Store::open_or_init(
//!     Path::new("trial.db"),
//!     Path::new("cell-count.csv"),
//! ).unwrap();
//! let mut explorer = Explorer::new(store, CohortFilter::default());
//!
//! let tests = explorer.response_tests().unwrap();
//! for t in tests.iter() {
//!     println!("{}: p = {:.4} ({})", t.population, t.p_value, t.significant.label());
//! }
//! ```

pub mod cache;
pub mod display;
pub mod error;
pub mod explore;
pub mod query;
pub mod render;
pub mod stats;
pub mod store;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::cache::Memo;
    pub use crate::display::{population_options, DisplayFilter};
    pub use crate::error::{CohortError, Result};
    pub use crate::explore::Explorer;
    pub use crate::query::{
        baseline_samples, cohort_frequency, frequency_table, response_breakdown,
        samples_per_project, sex_breakdown, BaselineSample, CohortFilter, CohortRow, FrequencyRow,
        ProjectCount, ResponseCount, SexCount,
    };
    pub use crate::stats::{
        mann_whitney_u, run_response_tests, MannWhitney, PopulationTest, ResponseTestSet,
        Significance, ALPHA,
    };
    pub use crate::store::{IngestSummary, Store, POPULATIONS};
}
