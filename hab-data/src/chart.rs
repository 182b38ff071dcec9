//! Chart documents for the watershed and single-site views.

use crate::aggregate::{aggregate_watersheds, facet_trend_lines, AggregateCell, FacetTrendLine};
use crate::trend::SiteDetail;
use hab_core::{hab_type::HabType, observation::Observation, variable::HabitatVariable};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// What the single-site bar chart puts on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxisMode {
    #[default]
    Actual,
    Deviation,
}

impl FromStr for YAxisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "actual" => Ok(YAxisMode::Actual),
            "deviation" | "deviation-from-mean" => Ok(YAxisMode::Deviation),
            other => Err(format!("unknown y axis mode '{}'", other)),
        }
    }
}

impl fmt::Display for YAxisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YAxisMode::Actual => f.write_str("actual"),
            YAxisMode::Deviation => f.write_str("deviation"),
        }
    }
}

/// A raw measurement overlaid on the watershed chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationPoint {
    pub site_id: String,
    pub year: i32,
    pub hab_type: HabType,
    pub watershed: String,
    pub habval: f64,
}

/// Yearly watershed means faceted by habitat type and watershed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatershedChart {
    pub habvar: String,
    pub label: String,
    pub cells: Vec<AggregateCell>,
    pub lines: Vec<FacetTrendLine>,
    /// Empty unless raw points were requested
    pub points: Vec<ObservationPoint>,
}

pub fn watershed_chart(rows: &[&Observation], habvar: &str, show_observations: bool) -> WatershedChart {
    let cells = aggregate_watersheds(rows.iter().copied());
    let lines = facet_trend_lines(&cells);
    let points = if show_observations {
        rows.iter()
            .filter_map(|obs| {
                obs.habval.map(|habval| ObservationPoint {
                    site_id: obs.site_id.clone(),
                    year: obs.year,
                    hab_type: obs.hab_type,
                    watershed: obs.watershed.clone(),
                    habval,
                })
            })
            .collect()
    } else {
        Vec::new()
    };
    WatershedChart {
        habvar: habvar.to_string(),
        label: HabitatVariable::label_for(habvar),
        cells,
        lines,
        points,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteBar {
    pub year: i32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteChartFacet {
    pub hab_type: HabType,
    pub title: String,
    pub bars: Vec<SiteBar>,
}

/// Bar chart of one site's yearly values, one facet per habitat type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteChart {
    pub site_id: String,
    pub habvar: String,
    pub label: String,
    pub y_axis_mode: YAxisMode,
    pub facets: Vec<SiteChartFacet>,
}

pub fn site_chart(detail: &SiteDetail, mode: YAxisMode) -> SiteChart {
    let label = match mode {
        YAxisMode::Actual => HabitatVariable::label_for(&detail.habvar),
        YAxisMode::Deviation => format!("{} (deviation from mean)", HabitatVariable::label_for(&detail.habvar)),
    };
    SiteChart {
        site_id: detail.site_id.clone(),
        habvar: detail.habvar.clone(),
        label,
        y_axis_mode: mode,
        facets: detail
            .facets
            .iter()
            .map(|facet| SiteChartFacet {
                hab_type: facet.hab_type,
                title: facet.title.clone(),
                bars: facet
                    .points
                    .iter()
                    .map(|p| SiteBar {
                        year: p.year,
                        y: match mode {
                            YAxisMode::Actual => p.value,
                            YAxisMode::Deviation => p.deviation,
                        },
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::{DetrendedPoint, SiteFacet};
    use hab_core::{location::Location, year_range::YearRange};

    fn observation(year: i32, habval: Option<f64>) -> Observation {
        Observation {
            site_id: "A".to_string(),
            year,
            hab_type: HabType::Riffle,
            watershed: "Lostine".to_string(),
            habvar: "StnEmbed".to_string(),
            habval,
            location: Location::default(),
        }
    }

    #[test]
    fn test_watershed_chart_points_are_optional() {
        let rows = vec![observation(2010, Some(1.0)), observation(2011, None), observation(2012, Some(3.0))];
        let refs: Vec<&Observation> = rows.iter().collect();

        let chart = watershed_chart(&refs, "StnEmbed", false);
        assert_eq!(chart.label, "Embeddedness (%)");
        assert_eq!(chart.cells.len(), 3);
        assert_eq!(chart.lines.len(), 1);
        assert!(chart.points.is_empty());

        let chart = watershed_chart(&refs, "StnEmbed", true);
        assert_eq!(chart.points.len(), 2);
    }

    #[test]
    fn test_site_chart_modes() {
        let detail = SiteDetail {
            site_id: "A".to_string(),
            habvar: "StnFines".to_string(),
            window: YearRange(2010, 2011),
            facets: vec![SiteFacet {
                hab_type: HabType::Run,
                title: "Run *".to_string(),
                trend: None,
                points: vec![
                    DetrendedPoint { year: 2010, value: 4.0, deviation: -1.0 },
                    DetrendedPoint { year: 2011, value: 6.0, deviation: 1.0 },
                ],
            }],
        };
        let actual = site_chart(&detail, YAxisMode::Actual);
        assert_eq!(actual.facets[0].bars[1].y, 6.0);
        assert_eq!(actual.label, "Fines (%)");
        let deviation = site_chart(&detail, YAxisMode::Deviation);
        assert_eq!(deviation.facets[0].bars[1].y, 1.0);
        assert_eq!(deviation.facets[0].title, "Run *");
    }

    #[test]
    fn test_y_axis_mode_parse() {
        assert_eq!("Deviation".parse::<YAxisMode>().unwrap(), YAxisMode::Deviation);
        assert_eq!("actual".parse::<YAxisMode>().unwrap(), YAxisMode::Actual);
        assert!("log".parse::<YAxisMode>().is_err());
    }
}
