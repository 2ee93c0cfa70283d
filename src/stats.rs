//! Small numeric helpers shared by the KPI and anomaly stages.
//!
//! The two fragile spots in the whole computation chain live here as pure
//! functions: the null-safe division behind `on_time_rate`, and the z-score
//! with its zero-deviation guard.

/// Null-safe ratio. Returns `None` when the denominator is not positive.
pub fn rate(numerator: i64, denominator: i64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Population mean and standard deviation (ddof = 0) of a metric series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
}

impl Moments {
    /// Compute population moments over the given values.
    ///
    /// Returns `None` for an empty series: there is no distribution to
    /// score against, so callers leave every z-score unset.
    pub fn population(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Population z-score of `value` against `moments`.
///
/// A zero standard deviation yields 0 for every value: a constant series
/// signals no anomaly on that metric.
pub fn zscore(value: f64, moments: Moments) -> f64 {
    if moments.std_dev == 0.0 {
        0.0
    } else {
        (value - moments.mean) / moments.std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_denominator_is_none() {
        assert_eq!(rate(8, 0), None);
        assert_eq!(rate(0, 0), None);
    }

    #[test]
    fn test_rate_divides() {
        assert_eq!(rate(8, 10), Some(0.8));
        assert_eq!(rate(0, 5), Some(0.0));
        assert_eq!(rate(5, 5), Some(1.0));
    }

    #[test]
    fn test_population_moments() {
        let m = Moments::population(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((m.mean - 5.0).abs() < 1e-12);
        // Population std dev, not the sample-corrected variant.
        assert!((m.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_moments_of_empty_series_is_none() {
        assert_eq!(Moments::population(&[]), None);
    }

    #[test]
    fn test_zscore() {
        let m = Moments {
            mean: 10.0,
            std_dev: 2.0,
        };
        assert!((zscore(14.0, m) - 2.0).abs() < 1e-12);
        assert!((zscore(7.0, m) + 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_zscore_of_constant_series_is_zero() {
        let m = Moments::population(&[0.9, 0.9, 0.9]).unwrap();
        assert_eq!(m.std_dev, 0.0);
        assert_eq!(zscore(0.9, m), 0.0);
        // Even a hypothetical off-distribution value maps to 0 under a
        // constant series.
        assert_eq!(zscore(0.1, m), 0.0);
    }

    #[test]
    fn test_two_point_series_bounds_zscore_at_one() {
        // With two distinct values the population z-score is always +/-1.
        let m = Moments::population(&[0.95, 0.40]).unwrap();
        assert!((zscore(0.95, m) - 1.0).abs() < 1e-12);
        assert!((zscore(0.40, m) + 1.0).abs() < 1e-12);
    }
}
