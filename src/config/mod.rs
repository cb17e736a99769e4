//! Configuration module for pulsewatch.
//!
//! Analysis options are passed explicitly to each engine instance; there is no
//! process-wide configuration state.

use crate::error::{PulsewatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest forecast horizon accepted, in sampling intervals.
pub const MAX_TREND_HORIZON_INTERVALS: f64 = 10_000.0;

/// Longest pattern trend window accepted (ten years).
pub const MAX_PATTERN_TREND_WINDOW: Duration = Duration::from_secs(3650 * 24 * 3600);

/// Top-level configuration, as loaded by the command-line front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulsewatchConfig {
    /// Analysis thresholds and windows.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl PulsewatchConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PulsewatchError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            PulsewatchError::Config(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()
    }
}

/// Options recognized by the analysis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing window used for rolling statistics.
    pub window_size: usize,
    /// z-score above which a point is anomalous.
    pub z_threshold: f64,
    /// Minimum similarity for two error patterns to share a cluster (0.0 - 1.0).
    pub similarity_threshold: f64,
    /// Candidate seasonal periods, in sampling intervals.
    pub candidate_seasonal_periods: Vec<usize>,
    /// Forecast horizon for trend estimates, in sampling intervals.
    pub trend_horizon_intervals: f64,
    /// Recurrence predictions below this probability are suppressed (0.0 - 1.0).
    pub min_prediction_probability: f64,
    /// Length of each window compared when classifying a pattern's trend.
    #[serde(with = "humantime_serde")]
    pub pattern_trend_window: Duration,
    /// Window over which recurrence probability is judged. When unset the
    /// span of each pattern's own history is used.
    #[serde(with = "humantime_serde::option", skip_serializing_if = "Option::is_none")]
    pub prediction_window: Option<Duration>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            z_threshold: 2.5,
            similarity_threshold: 0.7,
            candidate_seasonal_periods: vec![24, 168],
            trend_horizon_intervals: 1.0,
            min_prediction_probability: 0.3,
            pattern_trend_window: Duration::from_secs(24 * 3600),
            prediction_window: None,
        }
    }
}

impl AnalysisConfig {
    /// Validate thresholds and window sizes.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PulsewatchError::invalid_config(
                "window_size",
                "Window size must be positive",
            ));
        }

        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(PulsewatchError::invalid_config(
                "z_threshold",
                "z-score threshold must be a positive number",
            ));
        }

        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(PulsewatchError::invalid_config(
                "similarity_threshold",
                "Similarity threshold must be within [0, 1]",
            ));
        }

        if !(0.0..=1.0).contains(&self.min_prediction_probability) {
            return Err(PulsewatchError::invalid_config(
                "min_prediction_probability",
                "Probability cut-off must be within [0, 1]",
            ));
        }

        if self.candidate_seasonal_periods.contains(&0) {
            return Err(PulsewatchError::invalid_config(
                "candidate_seasonal_periods",
                "Seasonal periods must be positive",
            ));
        }

        if !(0.0..=MAX_TREND_HORIZON_INTERVALS).contains(&self.trend_horizon_intervals) {
            return Err(PulsewatchError::invalid_config(
                "trend_horizon_intervals",
                format!(
                    "Forecast horizon must be within [0, {}] intervals",
                    MAX_TREND_HORIZON_INTERVALS
                ),
            ));
        }

        if self.pattern_trend_window.is_zero() || self.pattern_trend_window > MAX_PATTERN_TREND_WINDOW {
            return Err(PulsewatchError::invalid_config(
                "pattern_trend_window",
                "Pattern trend window must be non-zero and at most 3650 days",
            ));
        }

        if self.prediction_window.is_some_and(|w| w.is_zero()) {
            return Err(PulsewatchError::invalid_config(
                "prediction_window",
                "Prediction window must be non-zero",
            ));
        }

        Ok(())
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Serde helper for Duration using humantime format.
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Same format for optional fields; absent or null means `None`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }

    pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        } else if let Some(s_val) = s.strip_suffix('s') {
            s_val
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        } else if let Some(m) = s.strip_suffix('m') {
            scaled_secs(m, 60)
        } else if let Some(h) = s.strip_suffix('h') {
            scaled_secs(h, 3600)
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        }
    }

    fn scaled_secs(value: &str, unit: u64) -> Result<Duration, String> {
        let v = value.parse::<u64>().map_err(|e| e.to_string())?;
        v.checked_mul(unit)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{}' is too large", value))
    }
}
