//! Statistical building blocks.
//!
//! Everything here is a pure function over borrowed slices: rolling window
//! statistics, autocorrelation-based seasonality detection, least-squares
//! trend fitting, and Pearson correlation.

mod correlation;
mod seasonality;
mod trend;
mod window;

pub use correlation::{
    pearson, CorrelationDirection, CorrelationMatrix, CorrelationPair, CorrelationStrength,
    PearsonCorrelationMatrix,
};
pub use seasonality::{autocorrelation, SeasonalityDetector, SeasonalityEstimate};
pub use trend::{ConfidenceLevel, LinearTrendEstimator, TrendEstimate};
pub use window::{WindowStatistic, WindowStats};

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[3.0, 3.0, 3.0]), 0.0);
    }
}
