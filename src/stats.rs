//! Summary statistics over a sequence of measurements

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistic computed per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
    Min,
    Max,
    /// Count of true values for boolean fields
    Sum,
}

impl Statistic {
    /// The statistics reported for numeric fields, in report order
    pub const NUMERIC: [Statistic; 4] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Min,
        Statistic::Max,
    ];

    /// Apply this statistic to a sequence of values
    ///
    /// Mean, median, min and max of an empty sequence are NaN; the sum is 0.
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Statistic::Mean => mean(values),
            Statistic::Median => median(values),
            Statistic::Min => min(values),
            Statistic::Max => max(values),
            Statistic::Sum => values.iter().sum(),
        }
    }

    /// Lowercase name, as written in report definitions
    pub fn name(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Sum => "sum",
        }
    }

    /// Capitalized name, used to build column labels like `AutomatonTimeMean`
    pub fn capitalized(self) -> &'static str {
        match self {
            Statistic::Mean => "Mean",
            Statistic::Median => "Median",
            Statistic::Min => "Min",
            Statistic::Max => "Max",
            Statistic::Sum => "Sum",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; for an even count, the average of the two middle values
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_median_odd_length() {
        assert_eq!(median(&[9.0, 1.0, 5.0, 3.0, 7.0]), 5.0);
    }

    #[test]
    fn test_median_even_length() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_single() {
        assert_eq!(median(&[42.0]), 42.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_min_max() {
        let values = [3.0, -1.0, 8.5, 2.0];
        assert_eq!(min(&values), -1.0);
        assert_eq!(max(&values), 8.5);
        assert!(min(&[]).is_nan());
        assert!(max(&[]).is_nan());
    }

    #[test]
    fn test_sum_counts_true_values() {
        assert_eq!(Statistic::Sum.apply(&[1.0, 0.0, 1.0, 1.0]), 3.0);
        assert_eq!(Statistic::Sum.apply(&[]), 0.0);
    }

    #[test]
    fn test_apply_dispatch() {
        let values = [2.0, 4.0, 9.0];
        assert_eq!(Statistic::Mean.apply(&values), 5.0);
        assert_eq!(Statistic::Median.apply(&values), 4.0);
        assert_eq!(Statistic::Min.apply(&values), 2.0);
        assert_eq!(Statistic::Max.apply(&values), 9.0);
    }

    #[test]
    fn test_names() {
        assert_eq!(Statistic::Median.to_string(), "median");
        assert_eq!(Statistic::Median.capitalized(), "Median");
    }

    #[test]
    fn test_deserialize_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            statistics: Vec<Statistic>,
        }
        let w: Wrapper = toml::from_str(r#"statistics = ["mean", "max"]"#).unwrap();
        assert_eq!(w.statistics, vec![Statistic::Mean, Statistic::Max]);
    }
}
