//! Command implementations for the habitat trends CLI.
//!
//! Each subcommand loads the survey tables, runs one report view through
//! the analysis pipeline and writes the result as JSON (or CSV for the
//! trend table) to a file or stdout.

use clap::Subcommand;
use hab_core::hab_type::HabType;
use hab_core::year_range::YearRange;
use hab_data::chart::YAxisMode;

pub mod dataset;
pub mod output;
pub mod report;

use dataset::DataSource;
use output::Format;

/// Parse a `START:END` year range argument.
pub fn parse_years(s: &str) -> anyhow::Result<YearRange> {
    let (start, end) = hab_utils::years::parse_year_range(s)?;
    Ok(YearRange(start, end))
}

#[derive(Subcommand)]
pub enum Command {
    /// List the habitat variables and whether the data carries them
    Variables {
        #[command(flatten)]
        data: DataSource,

        /// Output path (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// List survey sites with their watershed and location
    Sites {
        #[command(flatten)]
        data: DataSource,

        /// Only sites that measured this variable
        #[arg(long)]
        variable: Option<String>,

        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Yearly watershed means with gap-filled years and facet trend lines
    Watershed {
        #[command(flatten)]
        data: DataSource,

        /// Habitat variable key, e.g. StnFines
        #[arg(short = 'v', long)]
        variable: String,

        /// Habitat types to include (repeatable; all when omitted)
        #[arg(long = "hab-type")]
        hab_types: Vec<HabType>,

        /// Year range as START:END (defaults to the whole record)
        #[arg(short = 'y', long, value_parser = parse_years)]
        years: Option<YearRange>,

        /// Include the raw per-site observations
        #[arg(long)]
        show_observations: bool,

        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Kendall trend test for every site, with map markers
    TrendMap {
        #[command(flatten)]
        data: DataSource,

        #[arg(short = 'v', long)]
        variable: String,

        #[arg(long = "hab-type")]
        hab_types: Vec<HabType>,

        #[arg(short = 'y', long, value_parser = parse_years)]
        years: Option<YearRange>,

        /// json (results and markers) or csv (results only)
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Detrended yearly values and per-habitat-type trends for one site
    SiteDetail {
        #[command(flatten)]
        data: DataSource,

        /// Site to show; nothing is written until one is given
        #[arg(short = 's', long)]
        site: Option<String>,

        #[arg(short = 'v', long)]
        variable: String,

        #[arg(long = "hab-type")]
        hab_types: Vec<HabType>,

        #[arg(short = 'y', long, value_parser = parse_years)]
        years: Option<YearRange>,

        /// actual or deviation
        #[arg(long, default_value_t = YAxisMode::Actual)]
        y_axis: YAxisMode,

        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Raw values of one year as sized map markers
    Overview {
        #[command(flatten)]
        data: DataSource,

        #[arg(short = 'v', long)]
        variable: String,

        #[arg(long = "hab-type")]
        hab_type: HabType,

        /// Survey year (defaults to the latest year in the data)
        #[arg(long)]
        year: Option<i32>,

        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Stream polylines for the background map layer
    Streams {
        #[command(flatten)]
        data: DataSource,

        #[arg(short = 'o', long)]
        output: Option<String>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Variables { data, output } => report::run_variables(&data, output.as_deref()),
        Command::Sites {
            data,
            variable,
            output,
        } => report::run_sites(&data, variable.as_deref(), output.as_deref()),
        Command::Watershed {
            data,
            variable,
            hab_types,
            years,
            show_observations,
            output,
        } => report::run_watershed(
            &data,
            &variable,
            &hab_types,
            years,
            show_observations,
            output.as_deref(),
        ),
        Command::TrendMap {
            data,
            variable,
            hab_types,
            years,
            format,
            output,
        } => report::run_trend_map(&data, &variable, &hab_types, years, format, output.as_deref()),
        Command::SiteDetail {
            data,
            site,
            variable,
            hab_types,
            years,
            y_axis,
            output,
        } => report::run_site_detail(
            &data,
            site.as_deref(),
            &variable,
            &hab_types,
            years,
            y_axis,
            output.as_deref(),
        ),
        Command::Overview {
            data,
            variable,
            hab_type,
            year,
            output,
        } => report::run_overview(&data, &variable, hab_type, year, output.as_deref()),
        Command::Streams { data, output } => report::run_streams(&data, output.as_deref()),
    }
}
