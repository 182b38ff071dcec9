//! Writing report documents to a file or stdout.

use clap::ValueEnum;
use hab_data::trend::TrendResult;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

fn open(output: Option<&str>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&str>) -> anyhow::Result<()> {
    let mut writer = open(output)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Flat CSV row for one trend result.
#[derive(Serialize)]
struct TrendRow<'a> {
    site_id: &'a str,
    hab_type: &'a str,
    habvar: &'a str,
    watershed: &'a str,
    longitude: f64,
    latitude: f64,
    tau: f64,
    slope: f64,
    pval: f64,
    stars: &'a str,
    yrs: &'a str,
    n: usize,
    trend: &'a str,
}

impl<'a> From<&'a TrendResult> for TrendRow<'a> {
    fn from(r: &'a TrendResult) -> Self {
        TrendRow {
            site_id: &r.site_id,
            hab_type: r.hab_type.as_str(),
            habvar: &r.habvar,
            watershed: &r.watershed,
            longitude: r.location.longitude,
            latitude: r.location.latitude,
            tau: r.tau,
            slope: r.slope,
            pval: r.pval,
            stars: &r.stars,
            yrs: &r.yrs,
            n: r.n,
            trend: r.trend.as_str(),
        }
    }
}

pub fn write_trend_csv_to<W: Write>(results: &[TrendResult], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        wtr.serialize(TrendRow::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_trend_csv(results: &[TrendResult], output: Option<&str>) -> anyhow::Result<()> {
    write_trend_csv_to(results, open(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hab_core::{hab_type::HabType, location::Location};
    use hab_data::trend::TrendDirection;

    #[test]
    fn test_trend_csv_layout() {
        let results = vec![TrendResult {
            site_id: "CC-01".to_string(),
            hab_type: HabType::Riffle,
            habvar: "StnFines".to_string(),
            watershed: "Catherine Creek".to_string(),
            location: Location::new(-117.78, 45.15),
            tau: 0.62,
            slope: 1.1,
            pval: 0.05,
            stars: ".".to_string(),
            yrs: "2010, 2011, 2012, 2013".to_string(),
            n: 4,
            trend: TrendDirection::Increasing,
        }];
        let mut buf = Vec::new();
        write_trend_csv_to(&results, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "site_id,hab_type,habvar,watershed,longitude,latitude,tau,slope,pval,stars,yrs,n,trend"
        );
        assert_eq!(
            lines.next().unwrap(),
            "CC-01,riffle,StnFines,Catherine Creek,-117.78,45.15,0.62,1.1,0.05,.,\"2010, 2011, 2012, 2013\",4,inc"
        );
    }
}
