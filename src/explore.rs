//! Explorer session: store + cohort filter + memoized results.
//!
//! One `Explorer` per process. Every user interaction is a plain
//! request/response pass through these methods; repeated identical requests
//! within a session hit the memo instead of the store.

use crate::cache::Memo;
use crate::error::Result;
use crate::query::{
    self, BaselineSample, CohortFilter, CohortRow, FrequencyRow, ProjectCount, ResponseCount,
    SexCount,
};
use crate::stats::{run_response_tests, ResponseTestSet};
use crate::store::{IngestSummary, Store};
use std::path::Path;

/// Memoized facade over the query layer and statistics engine.
pub struct Explorer {
    store: Store,
    filter: CohortFilter,
    frequency: Memo<Vec<FrequencyRow>>,
    cohort: Memo<Vec<CohortRow>>,
    baseline: Memo<Vec<BaselineSample>>,
    projects: Memo<Vec<ProjectCount>>,
    responses: Memo<Vec<ResponseCount>>,
    sexes: Memo<Vec<SexCount>>,
    tests: Memo<ResponseTestSet>,
}

impl Explorer {
    /// Wrap a store with the given cohort filter.
    pub fn new(store: Store, filter: CohortFilter) -> Self {
        Self {
            store,
            filter,
            frequency: Memo::new(),
            cohort: Memo::new(),
            baseline: Memo::new(),
            projects: Memo::new(),
            responses: Memo::new(),
            sexes: Memo::new(),
            tests: Memo::new(),
        }
    }

    /// The active cohort filter.
    pub fn filter(&self) -> &CohortFilter {
        &self.filter
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Re-ingest from `source`; bumps the store generation, so every memoized
    /// table recomputes on next access.
    pub fn reload(&mut self, source: &Path) -> Result<IngestSummary> {
        self.store.reload(source)
    }

    /// Operation 1: the full frequency table.
    pub fn frequency_table(&mut self) -> Result<Vec<FrequencyRow>> {
        let generation = self.store.generation();
        let store = &self.store;
        self.frequency
            .fetch("frequency_table", "", generation, || {
                query::frequency_table(store)
            })
    }

    /// Operation 2: the cohort subset with response labels (all timepoints).
    pub fn cohort_frequency(&mut self) -> Result<Vec<CohortRow>> {
        let generation = self.store.generation();
        let store = &self.store;
        let filter = &self.filter;
        self.cohort
            .fetch("cohort_frequency", &filter.fingerprint(), generation, || {
                query::cohort_frequency(store, filter)
            })
    }

    /// Operation 3: baseline samples with subject attributes.
    pub fn baseline_samples(&mut self) -> Result<Vec<BaselineSample>> {
        let generation = self.store.generation();
        let store = &self.store;
        let filter = &self.filter;
        self.baseline
            .fetch("baseline_samples", &filter.fingerprint(), generation, || {
                query::baseline_samples(store, filter)
            })
    }

    /// Operation 4: baseline sample counts per project.
    pub fn samples_per_project(&mut self) -> Result<Vec<ProjectCount>> {
        let generation = self.store.generation();
        let store = &self.store;
        let filter = &self.filter;
        self.projects
            .fetch("samples_per_project", &filter.fingerprint(), generation, || {
                query::samples_per_project(store, filter)
            })
    }

    /// Operation 5: baseline distinct-subject counts per response label.
    pub fn response_breakdown(&mut self) -> Result<Vec<ResponseCount>> {
        let generation = self.store.generation();
        let store = &self.store;
        let filter = &self.filter;
        self.responses
            .fetch("response_breakdown", &filter.fingerprint(), generation, || {
                query::response_breakdown(store, filter)
            })
    }

    /// Operation 6: baseline distinct-subject counts per sex.
    pub fn sex_breakdown(&mut self) -> Result<Vec<SexCount>> {
        let generation = self.store.generation();
        let store = &self.store;
        let filter = &self.filter;
        self.sexes
            .fetch("sex_breakdown", &filter.fingerprint(), generation, || {
                query::sex_breakdown(store, filter)
            })
    }

    /// Responder vs non-responder tests over the full cohort subset.
    ///
    /// Always computed from the unfiltered cohort table; display filters
    /// never reach this input.
    pub fn response_tests(&mut self) -> Result<ResponseTestSet> {
        let rows = self.cohort_frequency()?;
        let generation = self.store.generation();
        let fingerprint = self.filter.fingerprint();
        self.tests
            .fetch("response_tests", &fingerprint, generation, move || {
                Ok(run_response_tests(&rows))
            })
    }
}
