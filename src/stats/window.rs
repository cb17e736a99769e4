//! Rolling mean and standard deviation over a trailing window.

use crate::error::{PulsewatchError, Result};
use crate::types::Sample;
use serde::{Deserialize, Serialize};

/// Statistics of one trailing window `[window_start, window_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStatistic {
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// First index covered by the window.
    pub window_start: usize,
    /// One past the last index covered by the window.
    pub window_end: usize,
}

impl WindowStatistic {
    /// Whether the window had no spread, making z-scores meaningless.
    pub fn is_degenerate(&self) -> bool {
        self.stddev == 0.0
    }

    /// Absolute z-score of `value` against this window, or `None` when the
    /// window is degenerate.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.is_degenerate() {
            None
        } else {
            Some((value - self.mean).abs() / self.stddev)
        }
    }
}

/// Computes rolling statistics over a fixed-size trailing window.
pub struct WindowStats;

impl WindowStats {
    /// Statistics for every trailing window of `window_size` samples.
    ///
    /// Result `k` describes samples `[k, k + window_size)`, so the statistic
    /// preceding sample `i` is at index `i - window_size`.
    pub fn compute(stream: &[Sample], window_size: usize) -> Result<Vec<WindowStatistic>> {
        let values: Vec<f64> = stream.iter().map(|s| s.value).collect();
        Self::compute_values(&values, window_size)
    }

    /// Same as [`WindowStats::compute`] over raw values.
    pub fn compute_values(values: &[f64], window_size: usize) -> Result<Vec<WindowStatistic>> {
        if window_size == 0 {
            return Err(PulsewatchError::invalid_config(
                "window_size",
                "Window size must be positive",
            ));
        }
        if values.len() < window_size {
            return Err(PulsewatchError::InsufficientData {
                needed: window_size,
                actual: values.len(),
            });
        }

        let n = window_size as f64;
        let stats = values
            .windows(window_size)
            .enumerate()
            .map(|(start, window)| {
                // Sums are taken relative to the first value so large
                // baselines do not cancel, and flat windows sum to exactly 0.
                let shift = window[0];
                let sum: f64 = window.iter().map(|v| v - shift).sum();
                let sum_sq: f64 = window.iter().map(|v| (v - shift).powi(2)).sum();
                Self::from_shifted_sums(shift, sum, sum_sq, n, start, start + window_size)
            })
            .collect();

        Ok(stats)
    }

    fn from_shifted_sums(
        shift: f64,
        sum: f64,
        sum_sq: f64,
        n: f64,
        start: usize,
        end: usize,
    ) -> WindowStatistic {
        let shifted_mean = sum / n;
        let variance = (sum_sq / n - shifted_mean * shifted_mean).max(0.0);
        WindowStatistic {
            mean: shift + shifted_mean,
            stddev: variance.sqrt(),
            window_start: start,
            window_end: end,
        }
    }
}
