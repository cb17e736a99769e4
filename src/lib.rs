//! Pulsewatch - time-series anomaly detection and error-pattern correlation.
//!
//! Pulsewatch ingests numeric metric streams (CPU, memory, network, error
//! rate) and categorical error events, and produces anomaly flags,
//! seasonality estimates, trend forecasts, correlation matrices and clusters
//! of recurring error patterns. All routines are deterministic functions over
//! the data they are handed.
//!
//! # Features
//!
//! - **Anomaly Scoring**: Trailing-window z-scores with severity and confidence.
//! - **Seasonality**: Autocorrelation at candidate periods.
//! - **Trends**: Least-squares fits with a 95% forecast interval.
//! - **Correlation**: Pairwise Pearson matrices across metrics.
//! - **Error Patterns**: Message normalization, aggregation and clustering.
//! - **Recurrence Prediction**: Inter-arrival statistics per pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      AnalysisEngine                          │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  Metrics                     │  Errors                       │
//! │  WindowStats                 │  normalize_message            │
//! │  SeasonalityDetector         │  PatternAggregator            │
//! │  AnomalyScorer               │  cluster_patterns             │
//! │  LinearTrendEstimator        │  PredictionEngine             │
//! │  PearsonCorrelationMatrix    │                               │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use pulsewatch::config::AnalysisConfig;
//! use pulsewatch::{AnalysisEngine, MetricKind, Sample};
//! use chrono::{Duration, TimeZone, Utc};
//! use std::collections::BTreeMap;
//!
//! let engine = AnalysisEngine::new(AnalysisConfig::default())?;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let samples: Vec<Sample> = (0..20)
//!     .map(|i| {
//!         let value = if i < 10 { 50.0 } else { 200.0 };
//!         Sample::new(start + Duration::minutes(i), value, MetricKind::Cpu)
//!     })
//!     .collect();
//!
//! let mut streams = BTreeMap::new();
//! streams.insert("cpu".to_string(), samples);
//!
//! let report = engine.analyze_metrics(&streams)?;
//! assert_eq!(report.anomalies.len(), 1);
//! # Ok::<(), pulsewatch::PulsewatchError>(())
//! ```

pub mod anomaly;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod patterns;
pub mod prediction;
pub mod stats;
pub mod types;

// Re-exports
pub use engine::{AnalysisEngine, MetricsReport, PatternReport};
pub use error::{PulsewatchError, Result};
pub use types::*;
