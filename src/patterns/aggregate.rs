//! Aggregation of error events into per-pattern statistics.

use super::{ErrorEvent, ErrorPattern};
use crate::config::MAX_PATTERN_TREND_WINDOW;
use crate::error::{PulsewatchError, Result};
use crate::types::Severity;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Business impact added per error-level event.
const BUSINESS_IMPACT_PER_ERROR: f64 = 100.0;

/// Upper bound of each impact dimension when comparing patterns.
pub(crate) const IMPACT_DIMENSION_CAP: f64 = 100.0;

/// Whether a pattern occurs more or less often than in the previous window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// Impact of a pattern along three dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactVector {
    /// One point per event with an identified user.
    pub user: f64,
    /// Summed CPU usage reported with the events.
    pub system: f64,
    /// 100 points per error-level event.
    pub business: f64,
}

impl ImpactVector {
    pub fn total(&self) -> f64 {
        self.user + self.system + self.business
    }

    /// Each dimension clamped to `[0, 100]`.
    pub fn capped(&self) -> Self {
        Self {
            user: self.user.clamp(0.0, IMPACT_DIMENSION_CAP),
            system: self.system.clamp(0.0, IMPACT_DIMENSION_CAP),
            business: self.business.clamp(0.0, IMPACT_DIMENSION_CAP),
        }
    }

    /// L1 distance between the capped vectors.
    pub fn capped_distance(&self, other: &Self) -> f64 {
        let a = self.capped();
        let b = other.capped();
        (a.user - b.user).abs() + (a.system - b.system).abs() + (a.business - b.business).abs()
    }
}

/// Groups error events by pattern key.
#[derive(Debug, Clone)]
pub struct PatternAggregator {
    trend_window: Duration,
}

impl Default for PatternAggregator {
    fn default() -> Self {
        Self {
            trend_window: Duration::hours(24),
        }
    }
}

impl PatternAggregator {
    /// Create an aggregator comparing windows of `trend_window`.
    pub fn new(trend_window: std::time::Duration) -> Result<Self> {
        let invalid = || {
            PulsewatchError::invalid_config(
                "pattern_trend_window",
                "Pattern trend window must be non-zero and at most 3650 days",
            )
        };
        if trend_window.is_zero() || trend_window > MAX_PATTERN_TREND_WINDOW {
            return Err(invalid());
        }
        let trend_window = Duration::from_std(trend_window).map_err(|_| invalid())?;
        Ok(Self { trend_window })
    }

    /// Aggregate events into patterns, ordered by first appearance in `events`.
    ///
    /// Trends compare the window ending at the latest event against the
    /// window before it.
    pub fn aggregate(&self, events: &[ErrorEvent]) -> Vec<ErrorPattern> {
        let Some(reference) = events.iter().map(|e| e.timestamp).max() else {
            return Vec::new();
        };

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut patterns: Vec<ErrorPattern> = Vec::new();
        let mut windows: Vec<(usize, usize)> = Vec::new();

        for event in events {
            let key = event.pattern_key();
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                patterns.push(new_pattern(key, event.timestamp));
                windows.push((0, 0));
                patterns.len() - 1
            });

            let pattern = &mut patterns[slot];
            pattern.frequency += 1;
            pattern.components.insert(event.component.clone());
            pattern.codes.insert(event.code.clone());
            pattern.first_seen = pattern.first_seen.min(event.timestamp);
            pattern.last_seen = pattern.last_seen.max(event.timestamp);
            pattern.severity = escalate(pattern.severity, event);

            if event.user_id.is_some() {
                pattern.impact.user += 1.0;
            }
            if let Some(cpu) = event.details.as_ref().and_then(|d| d.cpu_usage()) {
                pattern.impact.system += cpu;
            }
            if event.severity.is_error() {
                pattern.impact.business += BUSINESS_IMPACT_PER_ERROR;
            }

            let age = reference - event.timestamp;
            if age < self.trend_window {
                windows[slot].0 += 1;
            } else if age < self.trend_window * 2 {
                windows[slot].1 += 1;
            }
        }

        for (pattern, (recent, prior)) in patterns.iter_mut().zip(windows) {
            pattern.impact_score = pattern.impact.total();
            pattern.trend = classify_trend(recent, prior);
            debug!(
                pattern = %pattern.pattern_key,
                frequency = pattern.frequency,
                recent,
                prior,
                "Aggregated error pattern"
            );
        }

        patterns
    }
}

/// Aggregate with the default 24 hour trend window.
pub fn aggregate(events: &[ErrorEvent]) -> Vec<ErrorPattern> {
    PatternAggregator::default().aggregate(events)
}

fn new_pattern(pattern_key: String, seen: DateTime<Utc>) -> ErrorPattern {
    ErrorPattern {
        pattern_key,
        frequency: 0,
        severity: Severity::Low,
        components: BTreeSet::new(),
        codes: BTreeSet::new(),
        impact: ImpactVector::default(),
        impact_score: 0.0,
        trend: PatternTrend::Stable,
        cluster_id: None,
        first_seen: seen,
        last_seen: seen,
    }
}

fn escalate(current: Severity, event: &ErrorEvent) -> Severity {
    if event.severity.is_error() {
        Severity::High
    } else if event.severity == super::EventSeverity::Warning {
        current.max(Severity::Medium)
    } else {
        current
    }
}

fn classify_trend(recent: usize, prior: usize) -> PatternTrend {
    match recent.cmp(&prior) {
        std::cmp::Ordering::Greater => PatternTrend::Increasing,
        std::cmp::Ordering::Less => PatternTrend::Decreasing,
        std::cmp::Ordering::Equal => PatternTrend::Stable,
    }
}
