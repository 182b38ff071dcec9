//! Map-layer builders: marker sets the map renderer draws as-is.

use crate::trend::{TrendDirection, TrendResult};
use hab_core::{hab_type::HabType, location::Location, observation::Observation};
use hab_utils::numbers::rescale;
use serde::Serialize;

/// Smallest and largest marker radius, in pixels.
pub const MARKER_SIZE_RANGE: (f64, f64) = (2.0, 15.0);

pub const INCREASE_COLOR: &str = "#2166ac";
pub const DECREASE_COLOR: &str = "#b2182b";
pub const FLAT_COLOR: &str = "#969696";

pub fn direction_color(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Increasing => INCREASE_COLOR,
        TrendDirection::Decreasing => DECREASE_COLOR,
        TrendDirection::Flat => FLAT_COLOR,
    }
}

/// A site marker on the trend map: colour by direction, size by |tau|.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendMarker {
    pub site_id: String,
    pub hab_type: HabType,
    pub location: Location,
    pub color: &'static str,
    pub size: f64,
    pub label: String,
}

/// A site marker on the raw overview map: size by measured value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMarker {
    pub site_id: String,
    pub hab_type: HabType,
    pub location: Location,
    pub value: f64,
    pub size: f64,
    pub label: String,
}

/// Min and max of the values, or None if there are none.
fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// One marker per trend result, with |tau| rescaled across the batch
/// into [`MARKER_SIZE_RANGE`].
pub fn trend_markers(results: &[TrendResult]) -> Vec<TrendMarker> {
    let Some(domain) = extent(results.iter().map(|r| r.tau.abs())) else {
        return Vec::new();
    };
    results
        .iter()
        .map(|r| TrendMarker {
            site_id: r.site_id.clone(),
            hab_type: r.hab_type,
            location: r.location,
            color: direction_color(r.trend),
            size: rescale(r.tau.abs(), domain, MARKER_SIZE_RANGE),
            label: format!(
                "{} ({}): tau = {:.2}{}{}, years {}",
                r.site_id,
                r.hab_type,
                r.tau,
                if r.stars.is_empty() { "" } else { " " },
                r.stars,
                r.yrs
            ),
        })
        .collect()
}

/// One marker per measured row, with values rescaled into [`MARKER_SIZE_RANGE`].
///
/// Rows without a value are skipped.
pub fn overview_markers<'a, I>(rows: I) -> Vec<OverviewMarker>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let measured: Vec<(&Observation, f64)> = rows
        .into_iter()
        .filter_map(|obs| obs.habval.map(|v| (obs, v)))
        .collect();
    let Some(domain) = extent(measured.iter().map(|(_, v)| *v)) else {
        return Vec::new();
    };
    measured
        .into_iter()
        .map(|(obs, value)| OverviewMarker {
            site_id: obs.site_id.clone(),
            hab_type: obs.hab_type,
            location: obs.location,
            value,
            size: rescale(value, domain, MARKER_SIZE_RANGE),
            label: format!("{} ({} {}): {:.2}", obs.site_id, obs.hab_type, obs.year, value),
        })
        .collect()
}
