//! Distribution statistics
//!
//! Pure numeric routines comparing a reference sample against a production
//! sample: Population Stability Index over quantile bins, and the two-sample
//! Kolmogorov-Smirnov statistic. Both are deterministic and side-effect
//! free.
use crate::errors::DriftError;

/// Default number of quantile bins for PSI.
pub const DEFAULT_PSI_BINS: usize = 10;
/// Floor applied to bin fractions so the PSI log-ratio stays finite.
pub const DEFAULT_MIN_FRACTION: f64 = 1e-4;

fn sorted_copy(sample: &[f64]) -> Vec<f64> {
    let mut v = sample.to_vec();
    v.sort_unstable_by(|a, b| a.total_cmp(b));
    v
}

/// Linear-interpolated quantile of an already sorted sample, `q` in [0, 1].
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Quantile bin edges over the reference sample.
///
/// `bins + 1` evenly spaced quantiles, with equal edges collapsed. A
/// constant reference collapses to a single edge, in which case the edges
/// fall back to one bin spanning `[min - 0.5, max + 0.5]`.
fn quantile_edges(reference: &[f64], bins: usize) -> Vec<f64> {
    let sorted = sorted_copy(reference);
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| quantile(&sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    if edges.len() < 2 {
        let lo = sorted[0];
        let hi = sorted[sorted.len() - 1];
        edges = vec![lo - 0.5, hi + 0.5];
    }
    edges
}

/// Histogram counts with half-open bins `[e_i, e_{i+1})`, final bin closed.
/// Values outside the edge range, and NaN, are not counted.
fn histogram(sample: &[f64], edges: &[f64]) -> Vec<usize> {
    let n_bins = edges.len() - 1;
    let lo = edges[0];
    let hi = edges[n_bins];
    let mut counts = vec![0usize; n_bins];
    for &value in sample {
        if value.is_nan() || value < lo || value > hi {
            continue;
        }
        let idx = if value >= hi {
            n_bins - 1
        } else {
            edges.partition_point(|edge| *edge <= value) - 1
        };
        counts[idx] += 1;
    }
    counts
}

/// Population Stability Index between two numeric samples.
///
/// Bins are quantiles of the reference distribution; bin fractions are
/// floored at `min_fraction` to guard against empty bins.
///
/// * `reference` - Baseline sample the bins are derived from.
/// * `production` - Sample to compare against the baseline.
/// * `bins` - Requested number of quantile bins.
/// * `min_fraction` - Lower bound on any bin fraction.
pub fn population_stability_index(
    reference: &[f64],
    production: &[f64],
    bins: usize,
    min_fraction: f64,
) -> Result<f64, DriftError> {
    if reference.is_empty() || production.is_empty() {
        return Err(DriftError::EmptySample("PSI"));
    }

    let edges = quantile_edges(reference, bins);
    let ref_counts = histogram(reference, &edges);
    let prod_counts = histogram(production, &edges);

    let ref_size = reference.len() as f64;
    let prod_size = production.len() as f64;

    let psi = ref_counts
        .iter()
        .zip(&prod_counts)
        .map(|(&r, &p)| {
            let ref_frac = (r as f64 / ref_size).max(min_fraction);
            let prod_frac = (p as f64 / prod_size).max(min_fraction);
            (prod_frac - ref_frac) * (prod_frac / ref_frac).ln()
        })
        .sum();
    Ok(psi)
}

/// Two-sample Kolmogorov-Smirnov statistic.
///
/// Maximum absolute difference between the two empirical CDFs, evaluated at
/// every point of both samples with the right-side "count of elements <= x"
/// rule. Always in [0, 1].
pub fn kolmogorov_smirnov_stat(reference: &[f64], production: &[f64]) -> Result<f64, DriftError> {
    if reference.is_empty() || production.is_empty() {
        return Err(DriftError::EmptySample("KS"));
    }

    let ref_sorted = sorted_copy(reference);
    let prod_sorted = sorted_copy(production);
    let ref_size = ref_sorted.len() as f64;
    let prod_size = prod_sorted.len() as f64;

    let mut stat: f64 = 0.0;
    for &point in ref_sorted.iter().chain(prod_sorted.iter()) {
        let ref_cdf = ref_sorted.partition_point(|v| v.total_cmp(&point).is_le()) as f64 / ref_size;
        let prod_cdf = prod_sorted.partition_point(|v| v.total_cmp(&point).is_le()) as f64 / prod_size;
        stat = stat.max((ref_cdf - prod_cdf).abs());
    }
    Ok(stat)
}
