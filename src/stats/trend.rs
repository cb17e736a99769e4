//! Ordinary least-squares trend estimation and forecasting.

use crate::error::{PulsewatchError, Result};
use crate::types::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// |slope| below this (value per sampling interval) is considered flat.
const STABLE_SLOPE: f64 = 0.01;

/// z-value of a two-sided 95% interval.
const Z_95: f64 = 1.96;

/// Qualitative confidence in a fitted trend, derived from R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.8 {
            ConfidenceLevel::High
        } else if r_squared > 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Fitted line with a forecast and its 95% confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    /// Change in value per sampling interval.
    pub slope: f64,
    /// Value of the line at the first sample.
    pub intercept: f64,
    pub r_squared: f64,
    /// Line evaluated at the forecast horizon.
    pub forecast_value: f64,
    /// `forecast_value ± margin`.
    pub confidence_interval: (f64, f64),
    /// Half-width of the confidence interval (1.96 standard errors).
    pub margin: f64,
    pub direction: TrendDirection,
    pub confidence: ConfidenceLevel,
    /// x coordinate of the last fitted point, in sampling intervals.
    pub last_x: f64,
}

impl TrendEstimate {
    /// Value of the fitted line at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Line values `1..=steps` sampling intervals past the last fitted point.
    pub fn project(&self, steps: usize) -> Vec<f64> {
        (1..=steps)
            .map(|step| self.value_at(self.last_x + step as f64))
            .collect()
    }
}

/// Closed-form least-squares line fitting.
pub struct LinearTrendEstimator;

impl LinearTrendEstimator {
    /// Fit a line through timestamped values.
    ///
    /// Timestamps are rescaled to sampling-interval units (the mean spacing
    /// between samples), so the slope reads as change per interval. The
    /// forecast is taken `horizon` past the last sample, defaulting to one
    /// interval.
    pub fn fit(points: &[(DateTime<Utc>, f64)], horizon: Option<Duration>) -> Result<TrendEstimate> {
        let (xy, interval_secs) = Self::interval_units(points)?;
        let horizon_x = match horizon {
            Some(h) => h.as_secs_f64() / interval_secs,
            None => 1.0,
        };
        Self::fit_xy(&xy, horizon_x)
    }

    /// Like [`LinearTrendEstimator::fit`] with the horizon given directly in
    /// sampling intervals.
    pub fn fit_intervals(points: &[(DateTime<Utc>, f64)], horizon_intervals: f64) -> Result<TrendEstimate> {
        let (xy, _) = Self::interval_units(points)?;
        Self::fit_xy(&xy, horizon_intervals)
    }

    fn interval_units(points: &[(DateTime<Utc>, f64)]) -> Result<(Vec<(f64, f64)>, f64)> {
        if points.len() < 3 {
            return Err(PulsewatchError::InsufficientData {
                needed: 3,
                actual: points.len(),
            });
        }

        let first = points[0].0;
        let last = points[points.len() - 1].0;
        let span_secs = (last - first).num_milliseconds() as f64 / 1000.0;
        let interval_secs = span_secs / (points.len() - 1) as f64;
        if interval_secs <= 0.0 {
            return Err(PulsewatchError::DegenerateInput(
                "all samples share one timestamp".to_string(),
            ));
        }

        let xy = points
            .iter()
            .map(|(t, v)| {
                let secs = (*t - first).num_milliseconds() as f64 / 1000.0;
                (secs / interval_secs, *v)
            })
            .collect();

        Ok((xy, interval_secs))
    }

    /// Fit a line through `(x, y)` pairs, forecasting `horizon_x` past the
    /// largest x.
    pub fn fit_xy(points: &[(f64, f64)], horizon_x: f64) -> Result<TrendEstimate> {
        let count = points.len();
        if count < 3 {
            return Err(PulsewatchError::InsufficientData {
                needed: 3,
                actual: count,
            });
        }

        let n = count as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for &(x, y) in points {
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_xx += x * x;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON * n * sum_xx.abs().max(1.0) {
            return Err(PulsewatchError::DegenerateInput(
                "x values have no spread".to_string(),
            ));
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;

        let y_mean = sum_y / n;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for &(x, y) in points {
            let predicted = slope * x + intercept;
            ss_res += (y - predicted).powi(2);
            ss_tot += (y - y_mean).powi(2);
        }

        let r_squared = if ss_tot == 0.0 {
            1.0
        } else {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        };

        let standard_error = (ss_res / (n - 2.0)).sqrt();
        let margin = Z_95 * standard_error;

        let last_x = points
            .iter()
            .map(|&(x, _)| x)
            .fold(f64::NEG_INFINITY, f64::max);
        let forecast_value = slope * (last_x + horizon_x) + intercept;

        let direction = if slope.abs() < STABLE_SLOPE {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        Ok(TrendEstimate {
            slope,
            intercept,
            r_squared,
            forecast_value,
            confidence_interval: (forecast_value - margin, forecast_value + margin),
            margin,
            direction,
            confidence: ConfidenceLevel::from_r_squared(r_squared),
            last_x,
        })
    }
}
