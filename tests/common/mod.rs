//! Common test utilities for integration tests.

pub mod assertions;
pub mod fixtures;

use std::path::PathBuf;
use tempfile::TempDir;

// Re-export common types
pub use assertions::*;
pub use fixtures::*;

/// Scratch directory for tests that read configuration or input files.
pub struct TestEnv {
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Writes `content` to `name` inside the temp dir and returns its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
