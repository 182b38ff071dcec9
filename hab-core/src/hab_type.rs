use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel morphology classification under which habitat measurements are taken.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabType {
    Run,
    Riffle,
    Pool,
}

impl HabType {
    pub const ALL: [HabType; 3] = [HabType::Run, HabType::Riffle, HabType::Pool];

    pub fn as_str(&self) -> &'static str {
        match self {
            HabType::Run => "run",
            HabType::Riffle => "riffle",
            HabType::Pool => "pool",
        }
    }

    /// Capitalized name used in chart facet titles.
    pub fn title(&self) -> &'static str {
        match self {
            HabType::Run => "Run",
            HabType::Riffle => "Riffle",
            HabType::Pool => "Pool",
        }
    }
}

impl fmt::Display for HabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHabTypeError(pub String);

impl fmt::Display for ParseHabTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown habitat type '{}' (expected run, riffle or pool)", self.0)
    }
}

impl std::error::Error for ParseHabTypeError {}

impl FromStr for HabType {
    type Err = ParseHabTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "run" => Ok(HabType::Run),
            "riffle" => Ok(HabType::Riffle),
            "pool" => Ok(HabType::Pool),
            _ => Err(ParseHabTypeError(s.to_string())),
        }
    }
}
