use crate::{hab_type::HabType, location::Location};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected number of columns in a habitat CSV row:
/// `SiteID,Year,HabType,Watershed,habvar,habval,longitude,latitude`
pub const CSV_ROW_LENGTH: usize = 8;

/// Strings in the `habval` column that mean "not measured".
const MISSING_MARKERS: [&str; 3] = ["", "NA", "NaN"];

/// Errors that can occur when parsing habitat observations.
#[derive(Debug, PartialEq, Clone)]
pub enum ObservationError {
    Csv(String),
    ColumnCount { line: u64, found: usize },
    MissingSite { line: u64 },
    InvalidYear { line: u64, value: String },
    InvalidHabType { line: u64, value: String },
    InvalidCoordinate { line: u64, value: String },
}

impl fmt::Display for ObservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationError::Csv(msg) => write!(f, "habitat CSV error: {}", msg),
            ObservationError::ColumnCount { line, found } => write!(
                f,
                "line {}: expected {} columns, found {}",
                line, CSV_ROW_LENGTH, found
            ),
            ObservationError::MissingSite { line } => write!(f, "line {}: empty SiteID", line),
            ObservationError::InvalidYear { line, value } => {
                write!(f, "line {}: invalid year '{}'", line, value)
            }
            ObservationError::InvalidHabType { line, value } => {
                write!(f, "line {}: invalid habitat type '{}'", line, value)
            }
            ObservationError::InvalidCoordinate { line, value } => {
                write!(f, "line {}: invalid coordinate '{}'", line, value)
            }
        }
    }
}

impl std::error::Error for ObservationError {}

/// One habitat measurement: a variable at a site, in one habitat type, for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub site_id: String,
    pub year: i32,
    pub hab_type: HabType,
    pub watershed: String,
    pub habvar: String,
    /// None when the variable was not measured that visit
    pub habval: Option<f64>,
    pub location: Location,
}

impl Observation {
    /// Parse a habitat CSV (with headers) into Observations.
    pub fn parse_habitat_csv(csv_object: &str) -> Result<Vec<Observation>, ObservationError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        let mut observations = Vec::new();
        for row in rdr.records() {
            let record = row.map_err(|e| ObservationError::Csv(e.to_string()))?;
            observations.push(Observation::try_from(&record)?);
        }
        Ok(observations)
    }

    /// Whether this row carries a usable measurement.
    pub fn has_value(&self) -> bool {
        self.habval.is_some()
    }
}

fn parse_habval(raw: &str, line: u64) -> Option<f64> {
    let raw = raw.trim();
    if MISSING_MARKERS.contains(&raw) {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::warn!("line {}: treating unparsable habval '{}' as missing", line, raw);
            None
        }
    }
}

fn field(record: &StringRecord, i: usize) -> &str {
    record.get(i).unwrap_or("").trim()
}

fn parse_coordinate(raw: &str, line: u64) -> Result<f64, ObservationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ObservationError::InvalidCoordinate {
            line,
            value: raw.to_string(),
        })
}

impl TryFrom<&StringRecord> for Observation {
    type Error = ObservationError;

    fn try_from(value: &StringRecord) -> Result<Self, Self::Error> {
        let line = value.position().map(|p| p.line()).unwrap_or(0);
        if value.len() != CSV_ROW_LENGTH {
            return Err(ObservationError::ColumnCount {
                line,
                found: value.len(),
            });
        }
        let site_id = field(value, 0);
        if site_id.is_empty() {
            return Err(ObservationError::MissingSite { line });
        }
        let year = field(value, 1)
            .parse::<i32>()
            .map_err(|_| ObservationError::InvalidYear {
                line,
                value: field(value, 1).to_string(),
            })?;
        let hab_type = field(value, 2)
            .parse::<HabType>()
            .map_err(|_| ObservationError::InvalidHabType {
                line,
                value: field(value, 2).to_string(),
            })?;
        let longitude = parse_coordinate(field(value, 6), line)?;
        let latitude = parse_coordinate(field(value, 7), line)?;

        Ok(Observation {
            site_id: site_id.to_string(),
            year,
            hab_type,
            watershed: field(value, 3).to_string(),
            habvar: field(value, 4).to_string(),
            habval: parse_habval(field(value, 5), line),
            location: Location::new(longitude, latitude),
        })
    }
}
