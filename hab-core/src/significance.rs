/// Maps a p-value onto a significance-star string.
///
/// Thresholds are checked in ascending order and the first one the
/// p-value falls strictly below wins. A p-value at or above every
/// threshold maps to the empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificancePolicy {
    thresholds: Vec<(f64, &'static str)>,
}

impl Default for SignificancePolicy {
    fn default() -> Self {
        SignificancePolicy {
            thresholds: vec![(0.001, "***"), (0.01, "**"), (0.05, "*"), (0.1, ".")],
        }
    }
}

impl SignificancePolicy {
    /// Build a policy from (cutoff, symbol) pairs. Pairs are sorted by cutoff.
    pub fn new(mut thresholds: Vec<(f64, &'static str)>) -> Self {
        thresholds.sort_by(|a, b| a.0.total_cmp(&b.0));
        SignificancePolicy { thresholds }
    }

    pub fn stars(&self, pval: f64) -> &'static str {
        self.thresholds
            .iter()
            .find(|(cutoff, _)| pval < *cutoff)
            .map(|(_, symbol)| *symbol)
            .unwrap_or("")
    }
}
