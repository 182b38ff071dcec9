use serde::{Deserialize, Serialize};

/// A survey point in WGS84 decimal degrees.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Location {
            longitude,
            latitude,
        }
    }
}
