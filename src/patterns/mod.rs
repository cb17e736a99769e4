//! Error pattern analysis.
//!
//! Raw [`ErrorEvent`]s are reduced to canonical pattern keys, aggregated into
//! [`ErrorPattern`]s (frequency, components, severity, impact, trend), and
//! grouped into [`Cluster`]s of similar patterns.
//!
//! # Pipeline
//!
//! ```text
//! ErrorEvent ──► normalize_message ──► aggregate ──► cluster_patterns
//!                 (pattern key)       (ErrorPattern)   (Cluster)
//! ```

mod aggregate;
mod cluster;
mod normalize;

pub use aggregate::{aggregate, ImpactVector, PatternAggregator, PatternTrend};
pub use cluster::{cluster_patterns, similarity, Cluster};
pub use normalize::{normalize_message, PLACEHOLDER};

use crate::types::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Severity reported with a raw error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl EventSeverity {
    /// Whether this event counts as an error for escalation and impact.
    pub fn is_error(&self) -> bool {
        matches!(self, EventSeverity::Error | EventSeverity::Critical)
    }
}

/// Structured context attached to an error event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorDetails {
    /// Host load at the time of the error.
    SystemLoad { cpu_usage: f64, memory_usage: f64 },
    /// The request that failed.
    Request { endpoint: String, status: u16 },
    /// Captured stack frames, innermost first.
    Stack { frames: Vec<String> },
}

impl ErrorDetails {
    /// CPU usage contributed to the system impact dimension.
    pub fn cpu_usage(&self) -> Option<f64> {
        match self {
            ErrorDetails::SystemLoad { cpu_usage, .. } => Some(*cpu_usage),
            ErrorDetails::Request { .. } | ErrorDetails::Stack { .. } => None,
        }
    }
}

/// A single reported error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub code: String,
    pub message: String,
    pub component: String,
    pub severity: EventSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorEvent {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        code: impl Into<String>,
        message: impl Into<String>,
        component: impl Into<String>,
        severity: EventSeverity,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            code: code.into(),
            message: message.into(),
            component: component.into(),
            severity,
            user_id: None,
            session_id: None,
            details: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Canonical pattern key for this event's message.
    pub fn pattern_key(&self) -> String {
        normalize_message(&self.message)
    }
}

/// Aggregate of all events sharing a pattern key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPattern {
    pub pattern_key: String,
    pub frequency: usize,
    pub severity: Severity,
    pub components: BTreeSet<String>,
    /// Distinct error codes seen for this pattern.
    pub codes: BTreeSet<String>,
    pub impact: ImpactVector,
    /// Sum of the impact dimensions.
    pub impact_score: f64,
    pub trend: PatternTrend,
    pub cluster_id: Option<usize>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_builder_and_key() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let event = ErrorEvent::new("e1", t0, "500", "Network timeout 42", "api", EventSeverity::Error)
            .with_user("u1")
            .with_session("s1")
            .with_details(ErrorDetails::SystemLoad {
                cpu_usage: 80.0,
                memory_usage: 55.0,
            });

        assert_eq!(event.pattern_key(), "network timeout");
        assert_eq!(event.user_id.as_deref(), Some("u1"));
        assert_eq!(event.details.as_ref().and_then(|d| d.cpu_usage()), Some(80.0));
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{
            "id": "e7",
            "timestamp": "2024-06-01T08:00:00Z",
            "code": "503",
            "message": "upstream unavailable",
            "component": "gateway",
            "severity": "warning",
            "details": {"type": "request", "endpoint": "/orders", "status": 503}
        }"#;
        let event: ErrorEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.severity, EventSeverity::Warning);
        assert!(event.user_id.is_none());
        assert_eq!(
            event.details,
            Some(ErrorDetails::Request {
                endpoint: "/orders".to_string(),
                status: 503
            })
        );
    }

    #[test]
    fn test_is_error() {
        assert!(EventSeverity::Critical.is_error());
        assert!(EventSeverity::Error.is_error());
        assert!(!EventSeverity::Warning.is_error());
        assert!(!EventSeverity::Info.is_error());
    }
}
