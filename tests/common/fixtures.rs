// Test fixtures and data generators for integration tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use pulsewatch::patterns::{ErrorDetails, ErrorEvent, EventSeverity};
use pulsewatch::{MetricKind, Sample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Fixed start time for generated data.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap()
}

/// Samples at one-minute spacing from [`epoch`].
pub fn samples_from(metric: &str, values: &[f64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::new(epoch() + Duration::minutes(i as i64), *v, MetricKind::from_key(metric)))
        .collect()
}

/// Deterministic random data generator for reproducible tests
pub struct TestDataGenerator {
    rng: StdRng,
}

impl TestDataGenerator {
    /// Creates a new generator with a fixed seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform noise around `base`.
    pub fn noisy_values(&mut self, len: usize, base: f64, noise: f64) -> Vec<f64> {
        (0..len)
            .map(|_| base + self.rng.gen_range(-noise..=noise))
            .collect()
    }

    /// Sine wave of the given period plus uniform noise.
    pub fn seasonal_values(&mut self, len: usize, period: usize, amplitude: f64, noise: f64) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let phase = 2.0 * PI * i as f64 / period as f64;
                100.0 + amplitude * phase.sin() + self.rng.gen_range(-noise..=noise)
            })
            .collect()
    }

    /// Arbitrary values, including negative and large magnitudes.
    pub fn arbitrary_values(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.rng.gen_range(-1.0e4..1.0e4)).collect()
    }

    pub fn len_between(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    /// Error events drawn from a small set of message templates, with random
    /// numbers substituted so that normalization has work to do.
    pub fn error_events(&mut self, count: usize) -> Vec<ErrorEvent> {
        const TEMPLATES: &[(&str, &str)] = &[
            ("connection timeout after {}ms", "api"),
            ("disk quota exceeded on volume {}", "storage"),
            ("worker {} crashed", "jobs"),
            ("payment declined code {}", "billing"),
            ("cache miss for key {}", "cache"),
        ];
        const SEVERITIES: &[EventSeverity] = &[
            EventSeverity::Info,
            EventSeverity::Warning,
            EventSeverity::Error,
            EventSeverity::Critical,
        ];

        let mut minute = 0i64;
        (0..count)
            .map(|i| {
                minute += self.rng.gen_range(1..90);
                let (template, component) = *TEMPLATES.choose(&mut self.rng).unwrap();
                let message = template.replace("{}", &self.rng.gen_range(1..5000).to_string());
                let severity = *SEVERITIES.choose(&mut self.rng).unwrap();

                let mut event = ErrorEvent::new(
                    format!("evt-{}", i),
                    epoch() + Duration::minutes(minute),
                    format!("E{}", self.rng.gen_range(100..600)),
                    message,
                    component,
                    severity,
                );
                if self.rng.gen_bool(0.5) {
                    event = event.with_user(format!("user-{}", self.rng.gen_range(0..50)));
                }
                if self.rng.gen_bool(0.3) {
                    event = event.with_details(ErrorDetails::SystemLoad {
                        cpu_usage: self.rng.gen_range(0.0..100.0),
                        memory_usage: self.rng.gen_range(0.0..100.0),
                    });
                }
                event
            })
            .collect()
    }
}

impl Default for TestDataGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Events for one message recurring every `interval_minutes`.
pub fn recurring_events(message: &str, component: &str, count: usize, interval_minutes: i64) -> Vec<ErrorEvent> {
    (0..count)
        .map(|i| {
            ErrorEvent::new(
                format!("{}-{}", component, i),
                epoch() + Duration::minutes(i as i64 * interval_minutes),
                "500",
                message,
                component,
                EventSeverity::Error,
            )
        })
        .collect()
}
