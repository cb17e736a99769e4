//! Seasonality detection via autocorrelation at candidate lags.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Autocorrelation strength a candidate period must exceed to count.
const SEASONALITY_THRESHOLD: f64 = 0.5;

/// Result of seasonality detection for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityEstimate {
    /// Whether a periodic pattern was found.
    pub detected: bool,
    /// Detected period in samples.
    pub period: Option<usize>,
    /// Detected period as wall-clock time, when the sampling interval is known.
    pub period_duration: Option<Duration>,
    /// Autocorrelation strength at the detected period (0.0 - 1.0).
    pub strength: f64,
}

impl SeasonalityEstimate {
    pub fn none() -> Self {
        Self {
            detected: false,
            period: None,
            period_duration: None,
            strength: 0.0,
        }
    }

    /// Attach a wall-clock period given the stream's sampling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.period_duration = self
            .period
            .and_then(|p| u32::try_from(p).ok())
            .and_then(|p| interval.checked_mul(p));
        self
    }

    /// Human readable period, e.g. `24 samples` or `24 samples (86400s)`.
    pub fn describe_period(&self) -> Option<String> {
        let period = self.period?;
        Some(match self.period_duration {
            Some(d) => format!("{} samples ({}s)", period, d.as_secs()),
            None => format!("{} samples", period),
        })
    }
}

/// Normalized autocorrelation magnitude of `values` at `lag`.
///
/// `|Σ (v[i] - mean)(v[i + lag] - mean)| / Σ (v[i] - mean)²`. Returns `None`
/// when the lag is zero, the series is shorter than two full periods, or the
/// series has no variance.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || values.len() < 2 * lag {
        return None;
    }

    let mean = super::mean(values);
    let denominator: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if denominator == 0.0 {
        return None;
    }

    let numerator: f64 = values
        .iter()
        .zip(values.iter().skip(lag))
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum();

    Some(numerator.abs() / denominator)
}

/// Reports the strongest periodic pattern among candidate periods.
pub struct SeasonalityDetector;

impl SeasonalityDetector {
    /// Returns the first candidate period (in caller order) whose
    /// autocorrelation strength exceeds 0.5.
    pub fn detect(values: &[f64], candidate_periods: &[usize]) -> SeasonalityEstimate {
        for &period in candidate_periods {
            let Some(strength) = autocorrelation(values, period) else {
                continue;
            };

            if strength > SEASONALITY_THRESHOLD {
                return SeasonalityEstimate {
                    detected: true,
                    period: Some(period),
                    period_duration: None,
                    strength: strength.min(1.0),
                };
            }
        }

        SeasonalityEstimate::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(len: usize, period: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 50.0 + 10.0 * (2.0 * PI * i as f64 / period as f64).sin())
            .collect()
    }

    #[test]
    fn test_detects_daily_cycle() {
        let values = sine(24 * 7, 24);
        let estimate = SeasonalityDetector::detect(&values, &[24, 168]);

        assert!(estimate.detected);
        assert_eq!(estimate.period, Some(24));
        assert!(estimate.strength > 0.5 && estimate.strength <= 1.0);
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        // A 12-sample cycle also repeats every 24 samples.
        let values = sine(96, 12);
        let estimate = SeasonalityDetector::detect(&values, &[24, 12]);
        assert_eq!(estimate.period, Some(24));
    }

    #[test]
    fn test_skips_periods_longer_than_half_the_series() {
        let values = sine(100, 24);
        // 168 needs 336 samples; only 24 can be evaluated.
        let estimate = SeasonalityDetector::detect(&values, &[168]);
        assert!(!estimate.detected);
        assert_eq!(estimate.strength, 0.0);
        assert_eq!(autocorrelation(&values, 168), None);
    }

    #[test]
    fn test_constant_series_not_seasonal() {
        let values = vec![7.0; 100];
        let estimate = SeasonalityDetector::detect(&values, &[24]);
        assert_eq!(estimate, SeasonalityEstimate::none());
    }

    #[test]
    fn test_alternating_series_has_unit_lag_two_strength() {
        let values: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let strength = autocorrelation(&values, 2).unwrap();
        // 18 matching products over 20 squared deviations.
        assert!((strength - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_with_interval() {
        let estimate = SeasonalityDetector::detect(&sine(24 * 7, 24), &[24])
            .with_interval(Duration::from_secs(3600));
        assert_eq!(estimate.period_duration, Some(Duration::from_secs(86400)));
        assert_eq!(
            estimate.describe_period().as_deref(),
            Some("24 samples (86400s)")
        );
    }
}
