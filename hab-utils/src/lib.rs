//! Shared utility functions for habitat crates.

/// Numeric helpers for summary statistics and display rounding
pub mod numbers {
    /// Round to `places` decimal places (half away from zero).
    pub fn round_to(value: f64, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (value * factor).round() / factor
    }

    /// Arithmetic mean, or None for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Median of the values; sorts a copy. None for an empty slice.
    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Linearly map `value` from the `from` interval onto the `to` interval.
    ///
    /// A zero-width `from` interval maps everything to the middle of `to`.
    pub fn rescale(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
        let width = from.1 - from.0;
        if width == 0.0 || !width.is_finite() {
            return (to.0 + to.1) / 2.0;
        }
        to.0 + (value - from.0) / width * (to.1 - to.0)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_round_to() {
            assert_eq!(round_to(0.456, 2), 0.46);
            assert_eq!(round_to(-0.333333, 2), -0.33);
            assert_eq!(round_to(1.0, 2), 1.0);
        }

        #[test]
        fn test_mean() {
            assert_eq!(mean(&[10.0, 20.0, 30.0]), Some(20.0));
            assert_eq!(mean(&[]), None);
        }

        #[test]
        fn test_median() {
            assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
            assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
            assert_eq!(median(&[]), None);
        }

        #[test]
        fn test_rescale() {
            assert_eq!(rescale(0.0, (0.0, 1.0), (2.0, 15.0)), 2.0);
            assert_eq!(rescale(1.0, (0.0, 1.0), (2.0, 15.0)), 15.0);
            assert_eq!(rescale(0.5, (0.0, 1.0), (2.0, 12.0)), 7.0);
            // degenerate input range
            assert_eq!(rescale(0.7, (0.7, 0.7), (2.0, 15.0)), 8.5);
        }
    }
}

/// Year-range argument parsing
pub mod years {
    use crate::error::RangeError;

    /// Parse `"START:END"` (or a single `"YEAR"`) into an inclusive pair.
    pub fn parse_year_range(s: &str) -> anyhow::Result<(i32, i32)> {
        let s = s.trim();
        let (start, end) = match s.split_once(':') {
            Some((a, b)) => (a.trim().parse::<i32>()?, b.trim().parse::<i32>()?),
            None => {
                let year = s.parse::<i32>()?;
                (year, year)
            }
        };
        if start > end {
            return Err(RangeError(format!("{} starts after it ends", s)).into());
        }
        Ok((start, end))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_year_range() {
            assert_eq!(parse_year_range("2005:2015").unwrap(), (2005, 2015));
            assert_eq!(parse_year_range(" 2010 ").unwrap(), (2010, 2010));
            assert!(parse_year_range("2015:2005").is_err());
            assert!(parse_year_range("20x5:2015").is_err());
        }
    }
}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct RangeError(pub String);

    impl fmt::Display for RangeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Range error: {}", self.0)
        }
    }

    impl std::error::Error for RangeError {}
}
