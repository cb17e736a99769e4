//! Z-score anomaly detection over metric streams.
//!
//! Each sample past the initial window is compared against the statistics of
//! the window immediately preceding it. Samples whose absolute z-score
//! exceeds the threshold become [`AnomalyRecord`]s. Seasonality detected for
//! the stream raises confidence and is recorded as a contributing factor.
//!
//! Windows with zero spread are skipped: a flat baseline has no meaningful
//! z-score, so a stream of constant values never reports anomalies.

use crate::error::{PulsewatchError, Result};
use crate::stats::{SeasonalityEstimate, WindowStats};
use crate::types::{MetricKind, Sample, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// z-score at which a deviation is considered extreme.
const EXTREME_Z_SCORE: f64 = 3.0;

/// z-score above which a deviation is at least medium severity.
const MEDIUM_Z_SCORE: f64 = 2.5;

/// Absorbs rounding in the z-score so exact boundary cases classify stably.
const Z_TOLERANCE: f64 = 1e-9;

/// Confidence bonus per unit of seasonal strength.
const SEASONAL_CONFIDENCE_BOOST: f64 = 20.0;

/// Why a sample was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyFactor {
    /// z-score of 3 or more.
    ExtremeDeviation,
    /// Value above the window mean.
    HighValueDeviation,
    /// Value below the window mean.
    LowValueDeviation,
    /// The stream shows a periodic pattern of this many samples.
    SeasonalPattern { period: usize },
}

impl fmt::Display for AnomalyFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyFactor::ExtremeDeviation => write!(f, "extreme deviation"),
            AnomalyFactor::HighValueDeviation => write!(f, "high-value deviation"),
            AnomalyFactor::LowValueDeviation => write!(f, "low-value deviation"),
            AnomalyFactor::SeasonalPattern { period } => {
                write!(f, "seasonal pattern (period {})", period)
            }
        }
    }
}

/// A sample flagged as anomalous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub timestamp: DateTime<Utc>,
    pub metric: MetricKind,
    pub value: f64,
    /// Index of the sample within its stream.
    pub index: usize,
    /// `mean ± threshold · stddev` of the preceding window.
    pub expected_range: (f64, f64),
    pub z_score: f64,
    pub severity: Severity,
    /// Confidence (0 - 100).
    pub confidence: u8,
    pub factors: Vec<AnomalyFactor>,
}

impl AnomalyRecord {
    /// Factor descriptions as plain strings.
    pub fn factor_labels(&self) -> Vec<String> {
        self.factors.iter().map(|f| f.to_string()).collect()
    }
}

/// Flags samples that deviate from their trailing window.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    window_size: usize,
    z_threshold: f64,
}

impl Default for AnomalyScorer {
    fn default() -> Self {
        Self {
            window_size: 10,
            z_threshold: 2.5,
        }
    }
}

impl AnomalyScorer {
    pub fn new(window_size: usize, z_threshold: f64) -> Result<Self> {
        if window_size == 0 {
            return Err(PulsewatchError::invalid_config(
                "window_size",
                "Window size must be positive",
            ));
        }
        if !z_threshold.is_finite() || z_threshold <= 0.0 {
            return Err(PulsewatchError::invalid_config(
                "z_threshold",
                "z-score threshold must be a positive number",
            ));
        }
        Ok(Self {
            window_size,
            z_threshold,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    /// Score every sample past the initial window.
    ///
    /// Streams with no more than `window_size` samples yield nothing.
    pub fn score(
        &self,
        stream: &[Sample],
        seasonality: Option<&SeasonalityEstimate>,
    ) -> Vec<AnomalyRecord> {
        if stream.len() <= self.window_size {
            return Vec::new();
        }

        let windows = match WindowStats::compute(stream, self.window_size) {
            Ok(windows) => windows,
            Err(_) => return Vec::new(),
        };

        let seasonal = seasonality.filter(|s| s.detected);
        let mut records = Vec::new();

        for (index, sample) in stream.iter().enumerate().skip(self.window_size) {
            let window = &windows[index - self.window_size];
            let Some(z) = window.z_score(sample.value) else {
                trace!(metric = %sample.metric, index, "Skipping flat window");
                continue;
            };

            if z <= self.z_threshold {
                continue;
            }

            let mut factors = Vec::new();
            let extreme = z >= EXTREME_Z_SCORE - Z_TOLERANCE;
            if extreme {
                factors.push(AnomalyFactor::ExtremeDeviation);
            }
            if sample.value > window.mean {
                factors.push(AnomalyFactor::HighValueDeviation);
            } else if sample.value < window.mean {
                factors.push(AnomalyFactor::LowValueDeviation);
            }
            if let Some(period) = seasonal.and_then(|s| s.period) {
                factors.push(AnomalyFactor::SeasonalPattern { period });
            }

            let severity = classify_severity(z, &factors);

            let mut confidence = (z / 4.0 * 100.0).round().min(100.0);
            if let Some(s) = seasonal {
                confidence = (confidence + s.strength * SEASONAL_CONFIDENCE_BOOST).min(100.0);
            }

            let spread = self.z_threshold * window.stddev;
            records.push(AnomalyRecord {
                timestamp: sample.timestamp,
                metric: sample.metric.clone(),
                value: sample.value,
                index,
                expected_range: (window.mean - spread, window.mean + spread),
                z_score: z,
                severity,
                confidence: confidence.round() as u8,
                factors,
            });
        }

        records
    }
}

fn classify_severity(z: f64, factors: &[AnomalyFactor]) -> Severity {
    if factors.contains(&AnomalyFactor::ExtremeDeviation) {
        Severity::High
    } else if z > MEDIUM_Z_SCORE || factors.len() > 1 {
        Severity::Medium
    } else {
        Severity::Low
    }
}
