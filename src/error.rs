//! Error types for the pulsewatch analysis engine.
//!
//! This module provides a unified error type [`PulsewatchError`] for all
//! analysis operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Data sparsity**: a computation needs more samples than it was given.
//!   Most callers recover from this locally by returning an empty result.
//! - **Degenerate input**: the input is well-formed but statistically unusable
//!   (e.g. every timestamp identical).
//! - **Configuration**: a threshold or window size is out of range. These
//!   indicate a programming mistake and are surfaced immediately.
//!
//! # Example
//!
//! ```rust
//! use pulsewatch::error::{PulsewatchError, Result};
//!
//! fn need_three(values: &[f64]) -> Result<f64> {
//!     if values.len() < 3 {
//!         return Err(PulsewatchError::InsufficientData {
//!             needed: 3,
//!             actual: values.len(),
//!         });
//!     }
//!     Ok(values[2])
//! }
//!
//! let err = need_three(&[1.0]).unwrap_err();
//! assert!(err.is_data_sparsity());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for pulsewatch operations.
#[derive(Error, Debug)]
pub enum PulsewatchError {
    #[error("Insufficient data: need at least {needed} samples, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PulsewatchError {
    /// Shorthand for an [`PulsewatchError::InvalidConfig`] error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PulsewatchError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error reflects sparse or degenerate data rather than misuse.
    ///
    /// Callers typically turn these into "no result yet" instead of failing.
    pub fn is_data_sparsity(&self) -> bool {
        matches!(
            self,
            PulsewatchError::InsufficientData { .. } | PulsewatchError::DegenerateInput(_)
        )
    }

    /// Whether the error was caused by invalid configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PulsewatchError::InvalidConfig { .. } | PulsewatchError::Config(_)
        )
    }
}

impl From<serde_json::Error> for PulsewatchError {
    fn from(e: serde_json::Error) -> Self {
        PulsewatchError::Serialization(e.to_string())
    }
}

/// Result type alias for pulsewatch operations.
pub type Result<T> = std::result::Result<T, PulsewatchError>;
