//! Observability module for pulsewatch.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host application. [`init`] is the subscriber setup used by the
//! bundled command-line front end.

use crate::config::ObservabilityConfig;
use crate::error::{PulsewatchError, Result};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr so
/// that analysis output on stdout stays machine readable.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| PulsewatchError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| PulsewatchError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    debug!(level = %config.log_level, json = config.json_logs, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_reports_error() {
        let config = ObservabilityConfig {
            log_level: "warn".to_string(),
            json_logs: false,
        };
        // Only one global subscriber per process.
        let first = init(&config);
        let second = init(&config);
        assert!(first.is_err() || second.is_err());
    }
}
