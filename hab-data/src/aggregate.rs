//! Watershed-level yearly means with gap filling.

use hab_core::{hab_type::HabType, observation::Observation, year_range::YearRange};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Mean of one variable for one (year, habitat type, watershed) bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateCell {
    pub year: i32,
    pub hab_type: HabType,
    pub watershed: String,
    /// Non-missing observations in the bucket
    pub n: usize,
    /// NaN when `n == 0` (serialised as null)
    pub avehab: f64,
}

impl AggregateCell {
    pub fn has_data(&self) -> bool {
        self.n > 0
    }
}

/// Ordinary least-squares line `avehab = intercept + slope * year` for one facet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetTrendLine {
    pub hab_type: HabType,
    pub watershed: String,
    pub slope: f64,
    pub intercept: f64,
    pub start_year: i32,
    pub end_year: i32,
}

impl FacetTrendLine {
    pub fn value_at(&self, year: i32) -> f64 {
        self.intercept + self.slope * year as f64
    }
}

/// Group rows by (year, habitat type, watershed) and average the non-missing values.
///
/// Every (habitat type, watershed) facet that appears in `rows` gets a cell
/// for every year of the contiguous range spanned by `rows`, including
/// years with no data (`n = 0`, `avehab = NaN`). Output is ordered by
/// habitat type, watershed, then year. Empty input gives empty output.
pub fn aggregate_watersheds<'a, I>(rows: I) -> Vec<AggregateCell>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let rows: Vec<&'a Observation> = rows.into_iter().collect();
    let Some(span) = YearRange::spanning(rows.iter().map(|obs| obs.year)) else {
        return Vec::new();
    };

    let mut facets: BTreeSet<(HabType, &str)> = BTreeSet::new();
    let mut buckets: BTreeMap<(HabType, &str, i32), (usize, f64)> = BTreeMap::new();
    for obs in rows {
        facets.insert((obs.hab_type, obs.watershed.as_str()));
        if let Some(value) = obs.habval {
            let bucket = buckets
                .entry((obs.hab_type, obs.watershed.as_str(), obs.year))
                .or_insert((0, 0.0));
            bucket.0 += 1;
            bucket.1 += value;
        }
    }

    let mut cells = Vec::with_capacity(facets.len() * span.years().count());
    for (hab_type, watershed) in facets {
        for year in span.years() {
            let (n, sum) = buckets
                .get(&(hab_type, watershed, year))
                .copied()
                .unwrap_or((0, 0.0));
            cells.push(AggregateCell {
                year,
                hab_type,
                watershed: watershed.to_string(),
                n,
                avehab: if n > 0 { sum / n as f64 } else { f64::NAN },
            });
        }
    }
    cells
}

/// Fit a least-squares line through each facet's non-empty cells.
///
/// Facets with fewer than two years of data get no line.
pub fn facet_trend_lines(cells: &[AggregateCell]) -> Vec<FacetTrendLine> {
    let mut by_facet: BTreeMap<(HabType, &str), Vec<(f64, f64)>> = BTreeMap::new();
    for cell in cells.iter().filter(|c| c.has_data()) {
        by_facet
            .entry((cell.hab_type, cell.watershed.as_str()))
            .or_default()
            .push((cell.year as f64, cell.avehab));
    }

    by_facet
        .into_iter()
        .filter_map(|((hab_type, watershed), points)| {
            let n = points.len() as f64;
            let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
            let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
            let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
            if points.len() < 2 || sxx == 0.0 {
                return None;
            }
            let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
            let slope = sxy / sxx;
            let start_year = points.first().map(|p| p.0 as i32)?;
            let end_year = points.last().map(|p| p.0 as i32)?;
            Some(FacetTrendLine {
                hab_type,
                watershed: watershed.to_string(),
                slope,
                intercept: mean_y - slope * mean_x,
                start_year,
                end_year,
            })
        })
        .collect()
}
