pub mod filter;
pub mod hab_type;
pub mod location;
pub mod observation;
pub mod significance;
pub mod trend_series;
pub mod variable;
pub mod year_range;
