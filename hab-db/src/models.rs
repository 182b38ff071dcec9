//! Query result model structs for habitat data.
//!
//! All structs derive `Serialize` so they can be written out as JSON
//! for the chart and map renderers.

use hab_core::location::Location;
use serde::Serialize;

/// Site metadata for selection lists and map labels.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteInfo {
    pub site_id: String,
    pub watershed: String,
    pub location: Location,
    /// Number of distinct survey years with at least one measurement.
    pub years_surveyed: i64,
}

/// One stream polyline of the background map layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StreamLine {
    pub stream_id: String,
    pub name: String,
    /// Vertices in drawing order.
    pub vertices: Vec<Location>,
}
