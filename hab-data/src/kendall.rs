//! Kendall rank-correlation trend test with a Theil-Sen slope.
//!
//! The test statistic is `S = Σ sgn(x_j - x_i) · sgn(y_j - y_i)` over all
//! pairs. Tau is Kendall's tau-b, so ties in either variable shrink the
//! denominator. The two-sided p-value comes from the normal approximation
//! of S with tie-corrected variance and a continuity correction.

use crate::trend::TrendError;
use hab_utils::numbers::median;
use std::cmp::Ordering;

/// Fewest points the test will run on.
pub const MIN_TREND_POINTS: usize = 3;

/// Outcome of a successful test. Values are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct KendallTest {
    pub n: usize,
    pub s: f64,
    pub var_s: f64,
    pub tau: f64,
    pub z: f64,
    pub pval: f64,
    /// Theil-Sen slope: median of pairwise slopes, in y units per x unit.
    pub slope: f64,
}

fn sign(a: f64, b: f64) -> f64 {
    match b.partial_cmp(&a) {
        Some(Ordering::Greater) => 1.0,
        Some(Ordering::Less) => -1.0,
        _ => 0.0,
    }
}

/// Sizes of every group of tied values (groups of one are left out).
fn tie_groups(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut groups = Vec::new();
    let mut run = 1usize;
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
        } else {
            if run > 1 {
                groups.push(run as f64);
            }
            run = 1;
        }
    }
    if run > 1 {
        groups.push(run as f64);
    }
    groups
}

fn variance_of_s(n: f64, x_ties: &[f64], y_ties: &[f64]) -> f64 {
    let sum = |ties: &[f64], f: fn(f64) -> f64| ties.iter().map(|&t| f(t)).sum::<f64>();
    let v0 = n * (n - 1.0) * (2.0 * n + 5.0);
    let vt = sum(x_ties, |t| t * (t - 1.0) * (2.0 * t + 5.0));
    let vu = sum(y_ties, |t| t * (t - 1.0) * (2.0 * t + 5.0));
    let v1 = sum(x_ties, |t| t * (t - 1.0)) * sum(y_ties, |t| t * (t - 1.0)) / (2.0 * n * (n - 1.0));
    let v2 = sum(x_ties, |t| t * (t - 1.0) * (t - 2.0)) * sum(y_ties, |t| t * (t - 1.0) * (t - 2.0))
        / (9.0 * n * (n - 1.0) * (n - 2.0));
    (v0 - vt - vu) / 18.0 + v1 + v2
}

/// Complementary error function (Numerical Recipes `erfcc`, |error| < 1.2e-7).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let r = t * (-z * z + poly).exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Run the test of `y ~ x`.
///
/// Fails with [`TrendError`] when the inputs differ in length, hold a
/// non-finite value, have fewer than [`MIN_TREND_POINTS`] points, or are
/// degenerate (every x or every y tied, so tau or the variance is undefined).
pub fn kendall_trend(x: &[f64], y: &[f64]) -> Result<KendallTest, TrendError> {
    if x.len() != y.len() {
        return Err(TrendError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(TrendError::NonFinite);
    }
    let len = x.len();
    if len < MIN_TREND_POINTS {
        return Err(TrendError::TooFewPoints { found: len });
    }

    let mut s = 0.0;
    let mut pairwise_slopes = Vec::with_capacity(len * (len - 1) / 2);
    for i in 0..len {
        for j in (i + 1)..len {
            s += sign(x[i], x[j]) * sign(y[i], y[j]);
            if x[j] != x[i] {
                pairwise_slopes.push((y[j] - y[i]) / (x[j] - x[i]));
            }
        }
    }

    let n = len as f64;
    let x_ties = tie_groups(x);
    let y_ties = tie_groups(y);
    let n0 = n * (n - 1.0) / 2.0;
    let n1: f64 = x_ties.iter().map(|t| t * (t - 1.0) / 2.0).sum();
    let n2: f64 = y_ties.iter().map(|t| t * (t - 1.0) / 2.0).sum();
    let denominator = ((n0 - n1) * (n0 - n2)).sqrt();
    let var_s = variance_of_s(n, &x_ties, &y_ties);
    if denominator <= 0.0 || var_s <= 0.0 {
        return Err(TrendError::Degenerate);
    }

    let tau = (s / denominator).clamp(-1.0, 1.0);
    let z = if s > 0.0 {
        (s - 1.0) / var_s.sqrt()
    } else if s < 0.0 {
        (s + 1.0) / var_s.sqrt()
    } else {
        0.0
    };
    let pval = erfc(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0);
    let slope = median(&pairwise_slopes).ok_or(TrendError::Degenerate)?;

    Ok(KendallTest {
        n: len,
        s,
        var_s,
        tau,
        z,
        pval,
        slope,
    })
}
