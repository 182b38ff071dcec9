//! One function per report view.

use crate::dataset::{snapshot, DataSource};
use crate::output::{write_json, write_trend_csv, Format};
use hab_core::{hab_type::HabType, variable::CATALOG, year_range::YearRange};
use hab_data::chart::YAxisMode;
use hab_data::pipeline::{OverviewParams, Pipeline, SiteParams, TrendParams, WatershedParams};
use log::info;
use serde::Serialize;
use std::rc::Rc;

#[derive(Serialize)]
struct VariableEntry {
    key: &'static str,
    label: &'static str,
    present: bool,
}

fn pipeline(data: &DataSource) -> anyhow::Result<Pipeline> {
    let db = data.habitat_db()?;
    Ok(Pipeline::new(Rc::new(snapshot(&db)?)))
}

fn warn_unknown_variable(variable: &str) {
    if hab_core::variable::HabitatVariable::lookup(variable).is_none() {
        log::warn!("{} is not in the variable catalog", variable);
    }
}

pub fn run_variables(data: &DataSource, output: Option<&str>) -> anyhow::Result<()> {
    let present = data.habitat_db()?.query_habvars()?;
    let entries: Vec<VariableEntry> = CATALOG
        .iter()
        .map(|v| VariableEntry {
            key: v.key,
            label: v.label,
            present: present.iter().any(|p| p == v.key),
        })
        .collect();
    write_json(&entries, output)
}

pub fn run_sites(data: &DataSource, variable: Option<&str>, output: Option<&str>) -> anyhow::Result<()> {
    let sites = data.habitat_db()?.query_sites(variable)?;
    info!("{} sites", sites.len());
    write_json(&sites, output)
}

pub fn run_watershed(
    data: &DataSource,
    variable: &str,
    hab_types: &[HabType],
    years: Option<YearRange>,
    show_observations: bool,
    output: Option<&str>,
) -> anyhow::Result<()> {
    warn_unknown_variable(variable);
    let pipeline = pipeline(data)?;
    let chart = pipeline.watershed_chart(&WatershedParams {
        habvar: variable.to_string(),
        hab_types: hab_types.iter().copied().collect(),
        years,
        show_observations,
    });
    info!(
        "Watershed chart for {}: {} cells, {} trend lines",
        variable,
        chart.cells.len(),
        chart.lines.len()
    );
    write_json(&*chart, output)
}

#[derive(Serialize)]
struct TrendMapDocument<'a> {
    habvar: &'a str,
    window: Option<YearRange>,
    results: &'a [hab_data::trend::TrendResult],
    markers: &'a [hab_data::map::TrendMarker],
}

pub fn run_trend_map(
    data: &DataSource,
    variable: &str,
    hab_types: &[HabType],
    years: Option<YearRange>,
    format: Format,
    output: Option<&str>,
) -> anyhow::Result<()> {
    warn_unknown_variable(variable);
    let pipeline = pipeline(data)?;
    let map = pipeline.trend_map(&TrendParams {
        habvar: variable.to_string(),
        hab_types: hab_types.iter().copied().collect(),
        years,
    });
    info!("Trend map for {}: {} sites trended", variable, map.results.len());
    match format {
        Format::Csv => write_trend_csv(&map.results, output),
        Format::Json => write_json(
            &TrendMapDocument {
                habvar: variable,
                window: map.window,
                results: &map.results,
                markers: &map.markers,
            },
            output,
        ),
    }
}

#[derive(Serialize)]
struct SiteDocument<'a> {
    detail: &'a hab_data::trend::SiteDetail,
    chart: &'a hab_data::chart::SiteChart,
}

pub fn run_site_detail(
    data: &DataSource,
    site: Option<&str>,
    variable: &str,
    hab_types: &[HabType],
    years: Option<YearRange>,
    y_axis: YAxisMode,
    output: Option<&str>,
) -> anyhow::Result<()> {
    if site.is_none() {
        info!("No site selected; nothing to show");
        return Ok(());
    }
    warn_unknown_variable(variable);
    let pipeline = pipeline(data)?;
    let view = pipeline.site_view(&SiteParams {
        site: site.map(str::to_string),
        habvar: variable.to_string(),
        hab_types: hab_types.iter().copied().collect(),
        years,
        y_axis_mode: y_axis,
    });
    match &*view {
        Some(view) => write_json(
            &SiteDocument {
                detail: &view.detail,
                chart: &view.chart,
            },
            output,
        ),
        None => {
            info!("Selected years fall outside the data; nothing to show");
            Ok(())
        }
    }
}

pub fn run_overview(
    data: &DataSource,
    variable: &str,
    hab_type: HabType,
    year: Option<i32>,
    output: Option<&str>,
) -> anyhow::Result<()> {
    warn_unknown_variable(variable);
    let pipeline = pipeline(data)?;
    let year = match year.or_else(|| pipeline.dataset().year_bounds().map(|b| b.end())) {
        Some(year) => year,
        None => anyhow::bail!("no survey years in {}", data.habitat_csv),
    };
    let markers = pipeline.overview(&OverviewParams {
        habvar: variable.to_string(),
        hab_type,
        year,
    });
    info!("Overview for {} {} {}: {} markers", variable, hab_type, year, markers.len());
    write_json(&*markers, output)
}

pub fn run_streams(data: &DataSource, output: Option<&str>) -> anyhow::Result<()> {
    let streams = data.streams_db()?.query_streams()?;
    write_json(&streams, output)
}
