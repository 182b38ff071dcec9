//! Filtering, aggregation and trend analysis for habitat observations.
//!
//! Everything here is a pure function over the immutable habitat table
//! and its trend-preparation relation. [`pipeline::Pipeline`] wires the
//! pieces together behind single-slot memo caches so a caller can
//! re-ask with the current selection and only pay for what changed.

pub mod aggregate;
pub mod chart;
pub mod filter;
pub mod kendall;
pub mod map;
pub mod pipeline;
pub mod trend;
