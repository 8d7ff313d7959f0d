//! Two-sample Mann-Whitney U test.
//!
//! Standard normal approximation with tie-corrected variance, two-sided
//! asymptotic p-value. No exact-test fallback for small samples: callers get
//! the asymptotic p regardless of n, which mirrors the upstream analysis this
//! tool reproduces.

use statrs::distribution::{ContinuousCDF, Normal};

/// Outcome of a single Mann-Whitney U test.
///
/// `u` is the U statistic of the first group. Both fields are NaN when the
/// test is undefined (one of the groups is empty).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MannWhitney {
    /// U statistic of the first group.
    pub u: f64,
    /// Two-sided asymptotic p-value.
    pub p_value: f64,
}

impl MannWhitney {
    fn undefined() -> Self {
        Self {
            u: f64::NAN,
            p_value: f64::NAN,
        }
    }
}

/// Compare two independent samples with the Mann-Whitney U test.
///
/// Ranks the pooled observations (average ranks for ties), computes the
/// first group's U statistic, and evaluates it against the tie-corrected
/// normal approximation:
///
/// ```text
/// mu    = n1 * n2 / 2
/// sigma = sqrt(n1 * n2 / 12 * ((n + 1) - sum(t^3 - t) / (n * (n - 1))))
/// ```
///
/// A zero variance (every pooled observation tied) reports p = 1.0: the data
/// cannot distinguish the groups. An empty group yields NaN fields.
pub fn mann_whitney_u(group_a: &[f64], group_b: &[f64]) -> MannWhitney {
    let n1 = group_a.len();
    let n2 = group_b.len();
    if n1 == 0 || n2 == 0 {
        return MannWhitney::undefined();
    }
    let n = n1 + n2;

    // Pool and sort; tag each value with its group.
    let mut pooled: Vec<(f64, bool)> = group_a
        .iter()
        .map(|&v| (v, true))
        .chain(group_b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Average ranks over tie runs; accumulate the rank sum of group A and
    // the tie-correction term sum(t^3 - t).
    let mut rank_sum_a = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        let run = (j - i) as f64;
        // ranks are 1-based; a run spanning positions i..j shares their mean
        let mean_rank = (i + 1 + j) as f64 / 2.0;
        for &(_, in_a) in &pooled[i..j] {
            if in_a {
                rank_sum_a += mean_rank;
            }
        }
        tie_term += run * run * run - run;
        i = j;
    }

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let nf = n as f64;
    let u = rank_sum_a - n1f * (n1f + 1.0) / 2.0;
    let mu = n1f * n2f / 2.0;
    let variance = n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));

    if variance <= 0.0 {
        // All pooled values tied; no detectable difference.
        return MannWhitney { u, p_value: 1.0 };
    }

    let z = (u - mu) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).unwrap();
    let p_value = (2.0 * (1.0 - normal.cdf(z.abs()))).min(1.0);

    MannWhitney { u, p_value }
}
