//! Recurrence prediction for known error patterns.
//!
//! Inter-arrival statistics of a pattern's past occurrences are combined with
//! the direction of its most recent intervals to estimate how likely the
//! pattern is to recur and when.

use crate::patterns::ErrorEvent;
use crate::stats::{mean, population_std_dev};
use crate::types::TrendDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Upper bound for both probability and confidence.
const MAX_ESTIMATE: f64 = 0.95;

/// Number of trailing intervals inspected for the interval trend.
const RECENT_INTERVALS: usize = 3;

/// Predicted recurrence of an error pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub pattern_key: String,
    /// Probability of recurrence (0.0 - 0.95).
    pub probability: f64,
    /// Confidence in the estimate (0.0 - 0.95).
    pub confidence: f64,
    pub expected_next: DateTime<Utc>,
    pub mean_interval: Duration,
    pub interval_stddev: Duration,
    /// Whether the gaps between recent occurrences are growing or shrinking.
    pub interval_trend: TrendDirection,
    pub event_count: usize,
    pub last_seen: DateTime<Utc>,
}

/// Estimates when a pattern will recur.
///
/// Probability compares the number of observed events with the number the
/// mean interval would produce over the analysis window. Without an explicit
/// window the span from first to last event is used.
#[derive(Debug, Clone, Default)]
pub struct PredictionEngine {
    window: Option<Duration>,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self { window: None }
    }

    /// Use a fixed analysis window instead of the observed span.
    pub fn with_window(window: Duration) -> Self {
        Self {
            window: Some(window),
        }
    }

    /// Predict the next occurrence from a pattern's events.
    ///
    /// Events need not be sorted. Returns `None` with fewer than two events
    /// or when every event shares one timestamp.
    pub fn predict(&self, pattern_key: &str, events: &[&ErrorEvent]) -> Option<PredictionResult> {
        let mut timestamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.timestamp).collect();
        timestamps.sort();
        self.predict_from_timestamps(pattern_key, &timestamps)
    }

    /// Predict from sorted occurrence timestamps.
    pub fn predict_from_timestamps(
        &self,
        pattern_key: &str,
        timestamps: &[DateTime<Utc>],
    ) -> Option<PredictionResult> {
        if timestamps.len() < 2 {
            return None;
        }

        let intervals: Vec<f64> = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_milliseconds() as f64)
            .collect();

        let mean_ms = mean(&intervals);
        if mean_ms <= 0.0 {
            return None;
        }
        let stddev_ms = population_std_dev(&intervals);

        let recent = &intervals[intervals.len().saturating_sub(RECENT_INTERVALS)..];
        let interval_trend = interval_trend(recent);

        let event_count = timestamps.len();
        let first = timestamps[0];
        let last = timestamps[event_count - 1];
        let window_ms = match self.window {
            Some(window) => window.as_millis() as f64,
            None => (last - first).num_milliseconds() as f64,
        };
        let expected_events = window_ms / mean_ms;

        let trend_multiplier = match interval_trend {
            TrendDirection::Increasing => 1.2,
            TrendDirection::Decreasing => 0.8,
            TrendDirection::Stable => 1.0,
        };
        let probability = (event_count as f64 / expected_events * trend_multiplier).min(MAX_ESTIMATE);

        let regularity = 1.0 - stddev_ms / mean_ms;
        let stability_bonus = if interval_trend == TrendDirection::Stable {
            1.2
        } else {
            1.0
        };
        let confidence = (regularity * (event_count as f64 / 10.0) * stability_bonus)
            .clamp(0.0, MAX_ESTIMATE);

        let expected_next = last + chrono::Duration::milliseconds(mean_ms.round() as i64);

        debug!(
            pattern = pattern_key,
            events = event_count,
            mean_interval_ms = mean_ms,
            probability,
            confidence,
            "Predicted recurrence"
        );

        Some(PredictionResult {
            pattern_key: pattern_key.to_string(),
            probability,
            confidence,
            expected_next,
            mean_interval: Duration::from_millis(mean_ms.round() as u64),
            interval_stddev: Duration::from_millis(stddev_ms.round() as u64),
            interval_trend,
            event_count,
            last_seen: last,
        })
    }
}

/// Compares the first and last of the recent intervals, without tolerance.
fn interval_trend(recent: &[f64]) -> TrendDirection {
    match (recent.first(), recent.last()) {
        (Some(first), Some(last)) if last > first => TrendDirection::Increasing,
        (Some(first), Some(last)) if last < first => TrendDirection::Decreasing,
        _ => TrendDirection::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::EventSeverity;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
    }

    fn at_minutes(offsets: &[i64]) -> Vec<DateTime<Utc>> {
        offsets
            .iter()
            .map(|m| t0() + chrono::Duration::minutes(*m))
            .collect()
    }

    #[test]
    fn test_regular_hourly_recurrence() {
        let timestamps: Vec<DateTime<Utc>> = at_minutes(&(0..12).map(|i| i * 60).collect::<Vec<_>>());
        let prediction = PredictionEngine::new()
            .predict_from_timestamps("db timeout", &timestamps)
            .unwrap();

        let expected = t0() + chrono::Duration::minutes(11 * 60 + 60);
        assert!((prediction.expected_next - expected).num_milliseconds().abs() <= 1000);
        assert!(prediction.confidence > 0.9);
        assert_eq!(prediction.probability, 0.95);
        assert_eq!(prediction.interval_trend, TrendDirection::Stable);
        assert_eq!(prediction.mean_interval, Duration::from_secs(3600));
        assert_eq!(prediction.interval_stddev, Duration::ZERO);
    }

    #[test]
    fn test_fixed_window_probability() {
        let timestamps: Vec<DateTime<Utc>> = at_minutes(&(0..12).map(|i| i * 60).collect::<Vec<_>>());
        let prediction = PredictionEngine::with_window(Duration::from_secs(24 * 3600))
            .predict_from_timestamps("db timeout", &timestamps)
            .unwrap();
        // 12 events where 24 were expected.
        assert!((prediction.probability - 0.5).abs() < 1e-12);

        // A short burst barely covers the window.
        let burst = at_minutes(&[0, 15, 30, 45, 60]);
        let prediction = PredictionEngine::with_window(Duration::from_secs(24 * 3600))
            .predict_from_timestamps("burst", &burst)
            .unwrap();
        assert!(prediction.probability < 0.3);
    }

    #[test]
    fn test_unsorted_events_are_sorted() {
        let events: Vec<ErrorEvent> = [120, 0, 60]
            .iter()
            .enumerate()
            .map(|(i, m)| {
                ErrorEvent::new(
                    i.to_string(),
                    t0() + chrono::Duration::minutes(*m),
                    "500",
                    "db timeout",
                    "db",
                    EventSeverity::Error,
                )
            })
            .collect();
        let refs: Vec<&ErrorEvent> = events.iter().collect();

        let prediction = PredictionEngine::new().predict("db timeout", &refs).unwrap();
        assert_eq!(prediction.last_seen, t0() + chrono::Duration::minutes(120));
        assert_eq!(prediction.expected_next, t0() + chrono::Duration::minutes(180));
    }

    #[test]
    fn test_interval_trend() {
        assert_eq!(interval_trend(&[10.0, 20.0, 30.0]), TrendDirection::Increasing);
        assert_eq!(interval_trend(&[30.0, 5.0, 10.0]), TrendDirection::Decreasing);
        assert_eq!(interval_trend(&[10.0, 99.0, 10.0]), TrendDirection::Stable);
        assert_eq!(interval_trend(&[10.0]), TrendDirection::Stable);
    }

    #[test]
    fn test_lengthening_gaps_raise_probability_multiplier() {
        // intervals 10, 10, 10, 20, 40: recent trend increasing
        let timestamps = at_minutes(&[0, 10, 20, 30, 50, 90]);
        let prediction = PredictionEngine::new()
            .predict_from_timestamps("slow", &timestamps)
            .unwrap();
        assert_eq!(prediction.interval_trend, TrendDirection::Increasing);
        // 6 events over 90 minutes at an 18 minute mean: 6 / 5 * 1.2 capped
        assert_eq!(prediction.probability, 0.95);
    }

    #[test]
    fn test_shrinking_gaps_lower_confidence_bonus() {
        // intervals 40, 20, 10: decreasing
        let timestamps = at_minutes(&[0, 40, 60, 70]);
        let prediction = PredictionEngine::new()
            .predict_from_timestamps("burst", &timestamps)
            .unwrap();
        assert_eq!(prediction.interval_trend, TrendDirection::Decreasing);
        // 4 events / (70 / 23.33) * 0.8 = 1.0667 -> capped
        assert_eq!(prediction.probability, 0.95);
        assert!(prediction.confidence < 0.4);
        assert!(prediction.confidence >= 0.0);
    }

    #[test]
    fn test_irregular_intervals_clamp_confidence_to_zero() {
        // stddev exceeds the mean interval
        let timestamps = at_minutes(&[0, 1, 2, 3, 200]);
        let prediction = PredictionEngine::new()
            .predict_from_timestamps("sporadic", &timestamps)
            .unwrap();
        assert_eq!(prediction.confidence, 0.0);
    }

    #[test]
    fn test_too_few_events() {
        let engine = PredictionEngine::new();
        assert!(engine.predict_from_timestamps("x", &[]).is_none());
        assert!(engine.predict_from_timestamps("x", &at_minutes(&[5])).is_none());
        assert!(engine.predict_from_timestamps("x", &at_minutes(&[5, 5, 5])).is_none());
    }
}
