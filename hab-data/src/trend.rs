//! Per-site trend engine.
//!
//! Each series is restricted to a year window, stripped of missing values,
//! mean-centred for display and run through [`kendall_trend`]. A site whose
//! test cannot run is dropped from batch output rather than failing it.

use crate::kendall::{kendall_trend, KendallTest};
use hab_core::{
    filter::ObservationFilter,
    hab_type::HabType,
    location::Location,
    significance::SignificancePolicy,
    trend_series::{TrendSeries, TrendTable},
    year_range::YearRange,
};
use hab_utils::numbers::{mean, round_to};
use serde::Serialize;
use std::fmt;

/// Decimal places kept on tau, slope and p-value.
pub const DISPLAY_PLACES: i32 = 2;

/// Why a trend test could not be computed for a series.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendError {
    TooFewPoints { found: usize },
    LengthMismatch { x: usize, y: usize },
    NonFinite,
    Degenerate,
}

impl fmt::Display for TrendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendError::TooFewPoints { found } => write!(
                f,
                "trend test needs at least {} points, found {}",
                crate::kendall::MIN_TREND_POINTS,
                found
            ),
            TrendError::LengthMismatch { x, y } => {
                write!(f, "x has {} values but y has {}", x, y)
            }
            TrendError::NonFinite => write!(f, "series contains a non-finite value"),
            TrendError::Degenerate => write!(f, "series has no variation to rank"),
        }
    }
}

impl std::error::Error for TrendError {}

/// Direction of a monotonic trend, from the sign of tau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrendDirection {
    #[serde(rename = "inc")]
    Increasing,
    #[serde(rename = "dec")]
    Decreasing,
    #[serde(rename = "flat")]
    Flat,
}

impl TrendDirection {
    pub fn from_tau(tau: f64) -> Self {
        if tau > 0.0 {
            TrendDirection::Increasing
        } else if tau < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "inc",
            TrendDirection::Decreasing => "dec",
            TrendDirection::Flat => "flat",
        }
    }
}

/// One retained year of a site series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetrendedPoint {
    pub year: i32,
    pub value: f64,
    /// `value` minus the mean of every retained value in the window
    pub deviation: f64,
}

/// Trend test summary for one site, habitat type and variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub site_id: String,
    pub hab_type: HabType,
    pub habvar: String,
    pub watershed: String,
    pub location: Location,
    pub tau: f64,
    pub slope: f64,
    pub pval: f64,
    pub stars: String,
    /// Years that went into the test, e.g. "2010, 2011, 2013"
    pub yrs: String,
    pub n: usize,
    pub trend: TrendDirection,
}

/// Mean-centre a series of (year, value) points.
pub fn detrend(points: &[(i32, f64)]) -> Vec<DetrendedPoint> {
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let Some(centre) = mean(&values) else {
        return Vec::new();
    };
    points
        .iter()
        .map(|&(year, value)| DetrendedPoint {
            year,
            value,
            deviation: value - centre,
        })
        .collect()
}

/// Comma-separated list of the years retained.
pub fn years_used(points: &[(i32, f64)]) -> String {
    points
        .iter()
        .map(|(year, _)| year.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn summarize(series: &TrendSeries, points: &[(i32, f64)], test: &KendallTest, policy: &SignificancePolicy) -> TrendResult {
    let tau = round_to(test.tau, DISPLAY_PLACES);
    TrendResult {
        site_id: series.site_id.clone(),
        hab_type: series.hab_type,
        habvar: series.habvar.clone(),
        watershed: series.watershed.clone(),
        location: series.location,
        tau,
        slope: round_to(test.slope, DISPLAY_PLACES),
        pval: round_to(test.pval, DISPLAY_PLACES),
        // stars come from the unrounded p-value so 0.049 stays significant
        stars: policy.stars(test.pval).to_string(),
        yrs: years_used(points),
        n: test.n,
        trend: TrendDirection::from_tau(tau),
    }
}

/// Run the trend test on one series restricted to `window`.
pub fn analyze_series(
    series: &TrendSeries,
    window: YearRange,
    policy: &SignificancePolicy,
) -> Result<TrendResult, TrendError> {
    let points = series.points_in(window);
    let years: Vec<f64> = points.iter().map(|(year, _)| *year as f64).collect();
    let values: Vec<f64> = points.iter().map(|(_, value)| *value).collect();
    let test = kendall_trend(&years, &values)?;
    Ok(summarize(series, &points, &test, policy))
}

/// Run [`analyze_series`] on every series, keeping the ones that succeed.
pub fn trend_batch<'a, I>(series: I, window: YearRange, policy: &SignificancePolicy) -> Vec<TrendResult>
where
    I: IntoIterator<Item = &'a TrendSeries>,
{
    let mut dropped = 0usize;
    let results: Vec<TrendResult> = series
        .into_iter()
        .filter_map(|s| match analyze_series(s, window, policy) {
            Ok(result) => Some(result),
            Err(e) => {
                log::debug!(
                    "dropping {} {} {} from trend batch: {}",
                    s.site_id,
                    s.hab_type,
                    s.habvar,
                    e
                );
                dropped += 1;
                None
            }
        })
        .collect();
    log::info!(
        "[HAB Debug] trend: {} series trended, {} dropped",
        results.len(),
        dropped
    );
    results
}

/// One habitat-type facet of the single-site view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteFacet {
    pub hab_type: HabType,
    /// Facet title: habitat type followed by the facet's significance stars
    pub title: String,
    /// None when this facet's own trend test could not run
    pub trend: Option<TrendResult>,
    pub points: Vec<DetrendedPoint>,
}

/// Full detrended history of one site for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDetail {
    pub site_id: String,
    pub habvar: String,
    pub window: YearRange,
    pub facets: Vec<SiteFacet>,
}

fn facet_title(hab_type: HabType, trend: Option<&TrendResult>) -> String {
    match trend {
        Some(t) if !t.stars.is_empty() => format!("{} {}", hab_type.title(), t.stars),
        _ => hab_type.title().to_string(),
    }
}

/// Detrended series and per-facet trend for one site.
///
/// Returns None until a site is selected. A selected site with no series
/// for `habvar` yields a detail with no facets.
pub fn site_detail(
    table: &TrendTable,
    site: Option<&str>,
    habvar: &str,
    hab_types: &[HabType],
    window: YearRange,
    policy: &SignificancePolicy,
) -> Option<SiteDetail> {
    let site = site?;
    let filter = ObservationFilter::new()
        .habvar(habvar)
        .hab_types(hab_types.iter().copied())
        .sites([site]);
    let facets = crate::filter::filter_trend_table(table, &filter)
        .into_iter()
        .map(|series| {
            let points = series.points_in(window);
            let trend = analyze_series(series, window, policy).ok();
            SiteFacet {
                hab_type: series.hab_type,
                title: facet_title(series.hab_type, trend.as_ref()),
                trend,
                points: detrend(&points),
            }
        })
        .collect();
    Some(SiteDetail {
        site_id: site.to_string(),
        habvar: habvar.to_string(),
        window,
        facets,
    })
}
