use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// An inclusive range of survey years, `YearRange(start, end)`.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Hash, Serialize, Deserialize)]
pub struct YearRange(pub i32, pub i32);

impl YearRange {
    pub fn start(&self) -> i32 {
        self.0
    }

    pub fn end(&self) -> i32 {
        self.1
    }

    pub fn contains(&self, year: i32) -> bool {
        self.0 <= year && year <= self.1
    }

    /// Every year from start through end. Empty when start > end.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.0..=self.1
    }

    /// The smallest range covering every year yielded, or None for no years.
    pub fn spanning<I: IntoIterator<Item = i32>>(years: I) -> Option<YearRange> {
        years.into_iter().fold(None, |acc, year| match acc {
            None => Some(YearRange(year, year)),
            Some(YearRange(lo, hi)) => Some(YearRange(lo.min(year), hi.max(year))),
        })
    }

    /// Clamp this range into `bounds`. Returns None when they do not overlap.
    pub fn clamp_to(&self, bounds: &YearRange) -> Option<YearRange> {
        let start = self.0.max(bounds.0);
        let end = self.1.min(bounds.1);
        if start <= end {
            Some(YearRange(start, end))
        } else {
            None
        }
    }
}
