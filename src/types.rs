//! Core type definitions for the pulsewatch analysis engine.
//!
//! # Key Types
//!
//! - [`Sample`]: One timestamped observation of a metric
//! - [`MetricKind`]: Which metric a sample belongs to
//! - [`MetricStream`]: Append-only, time-ordered sequence of samples
//! - [`Severity`]: Three-level severity shared by anomalies and error patterns
//! - [`TrendDirection`]: Direction of a fitted or observed trend
//!
//! # Examples
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use pulsewatch::types::{MetricKind, MetricStream, Sample};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let mut stream = MetricStream::new(MetricKind::Cpu);
//! stream.push(Sample::new(t0, 42.0, MetricKind::Cpu)).unwrap();
//! stream.push(Sample::new(t0 + Duration::minutes(1), 43.5, MetricKind::Cpu)).unwrap();
//!
//! assert_eq!(stream.len(), 2);
//! assert_eq!(stream.values(), vec![42.0, 43.5]);
//!
//! // Samples must arrive in timestamp order
//! assert!(stream.push(Sample::new(t0, 40.0, MetricKind::Cpu)).is_err());
//! ```

use crate::error::{PulsewatchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the metric a sample was taken from.
///
/// Serialized as its string key, so `"cpu"` and `MetricKind::Cpu` are
/// interchangeable on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricKind {
    Cpu,
    Memory,
    Network,
    ErrorRate,
    Custom(String),
}

impl MetricKind {
    /// Stable string key for this metric.
    pub fn key(&self) -> &str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Network => "network",
            MetricKind::ErrorRate => "error_rate",
            MetricKind::Custom(key) => key,
        }
    }

    /// Parse a metric key, falling back to [`MetricKind::Custom`].
    pub fn from_key(key: &str) -> Self {
        match key {
            "cpu" => MetricKind::Cpu,
            "memory" => MetricKind::Memory,
            "network" => MetricKind::Network,
            "error_rate" => MetricKind::ErrorRate,
            other => MetricKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for MetricKind {
    fn from(key: String) -> Self {
        MetricKind::from_key(&key)
    }
}

impl From<MetricKind> for String {
    fn from(kind: MetricKind) -> Self {
        kind.key().to_string()
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One timestamped observation of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the value was observed.
    pub timestamp: DateTime<Utc>,
    /// Observed value.
    pub value: f64,
    /// Metric the value belongs to.
    pub metric: MetricKind,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64, metric: MetricKind) -> Self {
        Self {
            timestamp,
            value,
            metric,
        }
    }
}

/// Append-only sequence of samples for a single metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricStream {
    metric: MetricKind,
    samples: Vec<Sample>,
}

impl MetricStream {
    pub fn new(metric: MetricKind) -> Self {
        Self {
            metric,
            samples: Vec::new(),
        }
    }

    /// Build a stream from samples, validating ordering and metric kind.
    pub fn from_samples(metric: MetricKind, samples: Vec<Sample>) -> Result<Self> {
        let mut stream = Self::new(metric);
        for sample in samples {
            stream.push(sample)?;
        }
        Ok(stream)
    }

    /// Append a sample. Rejects samples older than the newest one or
    /// belonging to a different metric.
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if sample.metric != self.metric {
            return Err(PulsewatchError::InvalidInput(format!(
                "sample for metric '{}' pushed to stream '{}'",
                sample.metric, self.metric
            )));
        }
        if let Some(last) = self.samples.last() {
            if sample.timestamp < last.timestamp {
                return Err(PulsewatchError::InvalidInput(format!(
                    "sample at {} is older than last sample at {}",
                    sample.timestamp, last.timestamp
                )));
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn metric(&self) -> &MetricKind {
        &self.metric
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The trailing `n` samples (or all of them if the stream is shorter).
    pub fn tail(&self, n: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Severity shared by anomaly records and error patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Numeric rank used by similarity scoring (low = 1, high = 3).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Direction of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}
