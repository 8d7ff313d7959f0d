//! Integration tests for the baseline subset queries and report rendering.

use immunocohort::prelude::*;
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::NamedTempFile;

const CSV_HEADER: &str = "project,subject,condition,age,sex,treatment,response,sample,sample_type,\
time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte";

fn store_from(rows: &[&str]) -> Store {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", CSV_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    Store::in_memory(file.path()).unwrap().0
}

/// The minimal three-subject scenario: two melanoma/PBMC/miraclib subjects
/// at baseline (one "yes" male, one "no" female) and one healthy subject
/// that every cohort query must exclude.
fn minimal_scenario() -> Store {
    store_from(&[
        "prj1,sbj1,melanoma,62,M,miraclib,yes,smp1,PBMC,0,100,200,300,250,150",
        "prj2,sbj2,melanoma,55,F,miraclib,no,smp2,PBMC,0,90,210,290,260,150",
        "prj1,sbj3,healthy,40,M,,,smp3,PBMC,0,100,100,100,100,100",
    ])
}

/// A richer cohort: sbj1 has two baseline samples and one later sample,
/// sbj4 is a baseline subject with no recorded response.
fn multi_sample_scenario() -> Store {
    store_from(&[
        "prj1,sbj1,melanoma,62,M,miraclib,yes,smp1,PBMC,0,100,200,300,250,150",
        "prj1,sbj1,melanoma,62,M,miraclib,yes,smp2,PBMC,0,110,190,310,240,150",
        "prj1,sbj1,melanoma,62,M,miraclib,yes,smp3,PBMC,14,120,180,320,230,150",
        "prj2,sbj2,melanoma,55,F,miraclib,no,smp4,PBMC,0,90,210,290,260,150",
        "prj2,sbj4,melanoma,47,F,miraclib,,smp5,PBMC,0,95,205,295,255,150",
        "prj1,sbj3,healthy,40,M,,,smp6,PBMC,0,100,100,100,100,100",
    ])
}

#[test]
fn minimal_scenario_baseline_and_breakdowns() {
    let mut explorer = Explorer::new(minimal_scenario(), CohortFilter::default());

    let baseline = explorer.baseline_samples().unwrap();
    assert_eq!(baseline.len(), 2);

    let responses = explorer.response_breakdown().unwrap();
    let by_label: Vec<(Option<&str>, i64)> = responses
        .iter()
        .map(|r| (r.response.as_deref(), r.subject_count))
        .collect();
    assert!(by_label.contains(&(Some("yes"), 1)));
    assert!(by_label.contains(&(Some("no"), 1)));
    assert_eq!(responses.len(), 2);

    let sexes = explorer.sex_breakdown().unwrap();
    let by_sex: Vec<(&str, i64)> = sexes
        .iter()
        .map(|s| (s.sex.as_str(), s.subject_count))
        .collect();
    assert_eq!(by_sex, vec![("F", 1), ("M", 1)]);

    // The healthy subject appears in none of the four outputs.
    assert!(baseline.iter().all(|r| r.subject_id != "sbj3"));
    let projects = explorer.samples_per_project().unwrap();
    assert_eq!(projects.iter().map(|p| p.sample_count).sum::<i64>(), 2);
}

#[test]
fn join_integrity_of_cohort_rows() {
    let mut explorer = Explorer::new(multi_sample_scenario(), CohortFilter::default());

    let cohort = explorer.cohort_frequency().unwrap();
    assert!(!cohort.is_empty());
    // The healthy subject's sample never leaks through the join.
    assert!(cohort.iter().all(|r| r.sample_id != "smp6"));

    // Every baseline row carries exactly the filter predicates.
    for row in explorer.baseline_samples().unwrap() {
        assert_eq!(row.condition, "melanoma");
        assert_eq!(row.sample_type, "PBMC");
        assert_eq!(row.treatment, "miraclib");
        assert_eq!(row.time_from_treatment_start, 0.0);
    }
}

#[test]
fn subjects_are_counted_once_not_per_sample() {
    let mut explorer = Explorer::new(multi_sample_scenario(), CohortFilter::default());

    let baseline = explorer.baseline_samples().unwrap();
    // sbj1 twice at baseline (smp3 is day 14), sbj2 and sbj4 once each.
    assert_eq!(baseline.len(), 4);
    let subjects: BTreeSet<&str> = baseline.iter().map(|r| r.subject_id.as_str()).collect();
    assert_eq!(subjects.len(), 3);

    let responses = explorer.response_breakdown().unwrap();
    let total_response_subjects: i64 = responses.iter().map(|r| r.subject_count).sum();
    assert_eq!(total_response_subjects as usize, subjects.len());
    // sbj1's two baseline samples contribute one subject, not two.
    let yes = responses
        .iter()
        .find(|r| r.response.as_deref() == Some("yes"))
        .unwrap();
    assert_eq!(yes.subject_count, 1);

    let sexes = explorer.sex_breakdown().unwrap();
    let total_sex_subjects: i64 = sexes.iter().map(|s| s.subject_count).sum();
    assert_eq!(total_sex_subjects as usize, subjects.len());
}

#[test]
fn null_response_forms_its_own_group() {
    let mut explorer = Explorer::new(multi_sample_scenario(), CohortFilter::default());

    let responses = explorer.response_breakdown().unwrap();
    assert_eq!(responses.len(), 3);
    let unknown = responses
        .iter()
        .find(|r| r.response.is_none())
        .expect("NULL response group present");
    assert_eq!(unknown.subject_count, 1);
}

#[test]
fn breakdowns_describe_the_identical_cohort() {
    let mut explorer = Explorer::new(multi_sample_scenario(), CohortFilter::default());

    let baseline = explorer.baseline_samples().unwrap();
    let baseline_subjects: BTreeSet<&str> =
        baseline.iter().map(|r| r.subject_id.as_str()).collect();

    // Project counts aggregate exactly the baseline samples.
    let projects = explorer.samples_per_project().unwrap();
    let project_sample_total: i64 = projects.iter().map(|p| p.sample_count).sum();
    assert_eq!(project_sample_total as usize, baseline.len());

    // Response and sex breakdowns partition exactly the baseline subjects.
    let responses = explorer.response_breakdown().unwrap();
    let sexes = explorer.sex_breakdown().unwrap();
    let response_total: i64 = responses.iter().map(|r| r.subject_count).sum();
    let sex_total: i64 = sexes.iter().map(|s| s.subject_count).sum();
    assert_eq!(response_total as usize, baseline_subjects.len());
    assert_eq!(sex_total as usize, baseline_subjects.len());
}

#[test]
fn report_renders_all_four_sections() {
    let mut explorer = Explorer::new(multi_sample_scenario(), CohortFilter::default());
    let report = immunocohort::render::subset_report(&mut explorer).unwrap();

    assert!(report.contains("melanoma PBMC Baseline Samples (miraclib)"));
    assert!(report.contains("Total samples: 4"));
    assert!(report.contains("Total unique subjects: 3"));
    assert!(report.contains("Samples per Project"));
    assert!(report.contains("Responders vs Non-Responders"));
    assert!(report.contains("Sex Breakdown"));
    assert!(!report.contains("sbj3"));
}

#[test]
fn empty_cohort_renders_neutral_report() {
    let filter = CohortFilter {
        condition: "carcinoma".to_string(),
        ..CohortFilter::default()
    };
    let mut explorer = Explorer::new(minimal_scenario(), filter);
    let report = immunocohort::render::subset_report(&mut explorer).unwrap();

    assert!(report.contains("Total samples: 0"));
    assert!(report.contains("(no rows)"));
}

#[test]
fn dashboard_applies_display_filters_to_frequency_only() {
    let mut explorer = Explorer::new(multi_sample_scenario(), CohortFilter::default());
    let display = DisplayFilter {
        sample_contains: Some("smp1".to_string()),
        populations: None,
    };
    let out = immunocohort::render::dashboard(&mut explorer, &display).unwrap();

    // Frequency overview narrowed to one sample's five rows.
    assert!(out.contains("5 rows (1 samples)"));
    // The statistics input stays unfiltered: every population is tested.
    for population in POPULATIONS {
        assert!(out.contains(population));
    }
}

#[test]
fn reload_invalidates_memoized_tables() {
    let mut explorer = Explorer::new(minimal_scenario(), CohortFilter::default());
    assert_eq!(explorer.frequency_table().unwrap().len(), 15);
    assert_eq!(explorer.baseline_samples().unwrap().len(), 2);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", CSV_HEADER).unwrap();
    writeln!(
        file,
        "prj1,sbj9,melanoma,50,F,miraclib,yes,smp9,PBMC,0,100,200,300,250,150"
    )
    .unwrap();
    file.flush().unwrap();

    explorer.reload(file.path()).unwrap();
    assert_eq!(explorer.frequency_table().unwrap().len(), 5);
    assert_eq!(explorer.baseline_samples().unwrap().len(), 1);
}
