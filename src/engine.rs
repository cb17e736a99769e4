//! Analysis facade tying the statistical routines together.
//!
//! An [`AnalysisEngine`] owns a validated [`AnalysisConfig`] and exposes the
//! three entry points used by hosts: metric analysis, error pattern analysis
//! and recurrence prediction. Every call works on the slices it is given and
//! leaves no state behind, so one engine can serve many threads.

use crate::anomaly::{AnomalyRecord, AnomalyScorer};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::patterns::{cluster_patterns, normalize_message, Cluster, ErrorEvent, ErrorPattern, PatternAggregator};
use crate::prediction::{PredictionEngine, PredictionResult};
use crate::stats::{
    CorrelationMatrix, LinearTrendEstimator, PearsonCorrelationMatrix, SeasonalityDetector,
    SeasonalityEstimate, TrendEstimate,
};
use crate::types::{MetricKind, MetricStream, Sample};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info};

/// Result of [`AnalysisEngine::analyze_metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Anomalies across all streams, ordered by timestamp then metric.
    pub anomalies: Vec<AnomalyRecord>,
    /// Trend per stream. Streams too short to fit are absent.
    pub trends: BTreeMap<String, TrendEstimate>,
    pub correlations: CorrelationMatrix,
    pub seasonality: BTreeMap<String, SeasonalityEstimate>,
}

/// Result of [`AnalysisEngine::analyze_error_patterns`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    /// Patterns in order of first appearance, with cluster ids assigned.
    pub patterns: Vec<ErrorPattern>,
    pub clusters: Vec<Cluster>,
}

/// Entry point for metric and error analysis.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    scorer: AnomalyScorer,
    aggregator: PatternAggregator,
    predictor: PredictionEngine,
}

impl AnalysisEngine {
    /// Create an engine, rejecting invalid configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let scorer = AnomalyScorer::new(config.window_size, config.z_threshold)?;
        let aggregator = PatternAggregator::new(config.pattern_trend_window)?;
        let predictor = match config.prediction_window {
            Some(window) => PredictionEngine::with_window(window),
            None => PredictionEngine::new(),
        };

        Ok(Self {
            config,
            scorer,
            aggregator,
            predictor,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run seasonality, anomaly, trend and correlation analysis over named
    /// metric streams.
    ///
    /// Each stream's samples must be in timestamp order and belong to the
    /// metric named by its key; violations are reported as
    /// [`InvalidInput`](crate::PulsewatchError::InvalidInput). Sparse streams
    /// are not an error: they simply contribute fewer results.
    pub fn analyze_metrics(&self, streams: &BTreeMap<String, Vec<Sample>>) -> Result<MetricsReport> {
        let mut anomalies = Vec::new();
        let mut trends = BTreeMap::new();
        let mut seasonality = BTreeMap::new();
        let mut series = BTreeMap::new();

        for (name, samples) in streams {
            let stream = MetricStream::from_samples(MetricKind::from_key(name), samples.clone())?;
            let values = stream.values();
            let interval = sampling_interval(stream.samples());

            let mut estimate =
                SeasonalityDetector::detect(&values, &self.config.candidate_seasonal_periods);
            if let Some(interval) = interval {
                estimate = estimate.with_interval(interval);
            }

            let found = self.scorer.score(stream.samples(), Some(&estimate));

            let points: Vec<_> = stream.samples().iter().map(|s| (s.timestamp, s.value)).collect();
            match LinearTrendEstimator::fit_intervals(&points, self.config.trend_horizon_intervals) {
                Ok(trend) => {
                    trends.insert(name.clone(), trend);
                }
                Err(e) if e.is_data_sparsity() => {
                    debug!(metric = %name, error = %e, "Skipping trend");
                }
                Err(e) => return Err(e),
            }

            debug!(
                metric = %name,
                samples = stream.len(),
                anomalies = found.len(),
                seasonal = estimate.detected,
                "Analyzed metric stream"
            );

            anomalies.extend(found);
            seasonality.insert(name.clone(), estimate);
            series.insert(name.clone(), values);
        }

        anomalies.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.metric.key().cmp(b.metric.key()))
        });

        let correlations = PearsonCorrelationMatrix::compute(&series);

        info!(
            streams = streams.len(),
            anomalies = anomalies.len(),
            trends = trends.len(),
            "Metric analysis complete"
        );

        Ok(MetricsReport {
            anomalies,
            trends,
            correlations,
            seasonality,
        })
    }

    /// Aggregate error events into patterns and cluster similar ones.
    pub fn analyze_error_patterns(&self, events: &[ErrorEvent]) -> PatternReport {
        let mut patterns = self.aggregator.aggregate(events);
        let clusters = cluster_patterns(&mut patterns, self.config.similarity_threshold);

        info!(
            events = events.len(),
            patterns = patterns.len(),
            clusters = clusters.len(),
            "Error pattern analysis complete"
        );

        PatternReport { patterns, clusters }
    }

    /// Predict the next occurrence of one pattern.
    ///
    /// `pattern` may be a pattern key or a raw message; it is normalized
    /// before matching. Predictions below the configured probability cut-off
    /// are suppressed.
    pub fn predict_recurrence(&self, events: &[ErrorEvent], pattern: &str) -> Option<PredictionResult> {
        let key = normalize_message(pattern);
        let matching: Vec<&ErrorEvent> = events.iter().filter(|e| e.pattern_key() == key).collect();

        let prediction = self.predictor.predict(&key, &matching)?;
        self.keep_if_likely(prediction)
    }

    /// Predict every pattern present in `events`, most probable first.
    pub fn predict_all(&self, events: &[ErrorEvent]) -> Vec<PredictionResult> {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<&ErrorEvent>> = HashMap::new();
        for event in events {
            let key = event.pattern_key();
            grouped
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(event);
        }

        let mut predictions: Vec<PredictionResult> = order
            .iter()
            .filter_map(|key| {
                let group = grouped.get(key)?;
                self.predictor.predict(key, group)
            })
            .filter_map(|p| self.keep_if_likely(p))
            .collect();

        predictions.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.pattern_key.cmp(&b.pattern_key))
        });

        info!(
            patterns = order.len(),
            predictions = predictions.len(),
            "Recurrence prediction complete"
        );

        predictions
    }

    fn keep_if_likely(&self, prediction: PredictionResult) -> Option<PredictionResult> {
        if prediction.probability < self.config.min_prediction_probability {
            debug!(
                pattern = %prediction.pattern_key,
                probability = prediction.probability,
                "Suppressing unlikely recurrence"
            );
            return None;
        }
        Some(prediction)
    }
}

/// Mean spacing between consecutive samples.
fn sampling_interval(samples: &[Sample]) -> Option<Duration> {
    let (first, last) = (samples.first()?, samples.last()?);
    if samples.len() < 2 {
        return None;
    }
    let span = (last.timestamp - first.timestamp).to_std().ok()?;
    if span.is_zero() {
        return None;
    }
    Some(span / (samples.len() - 1) as u32)
}
