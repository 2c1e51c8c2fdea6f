//! Test runner contract
//!
//! A test runner adapts one external project to the driver's lifecycle:
//! environment setup, settings application, per-preset compile and test,
//! and cleanup. Concrete runners are selected at construction time and
//! reached only through this trait.

pub mod command;

pub use command::CommandRunner;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::common::{Error, Result};
use crate::presets::Preset;

/// Handle to the current test directory.
///
/// Every runner operation is scoped to the acquired project's directory;
/// the accessor fails when `setup_environment` has not yet established it.
#[derive(Debug, Default, Clone)]
pub struct TestDir(Option<PathBuf>);

impl TestDir {
    pub fn set(&mut self, dir: &Path) {
        self.0 = Some(dir.to_path_buf());
    }

    /// Current test directory, or a configuration error when unset
    pub fn get(&self) -> Result<&Path> {
        self.0
            .as_deref()
            .ok_or_else(|| Error::Config("test directory not defined".to_string()))
    }
}

/// Lifecycle contract between the orchestrator and a per-project adapter.
///
/// `compile` and `run_test` are invoked once per selected preset, strictly
/// in order, with no cleanup in between: adapters must tolerate cumulative
/// filesystem state across presets within one run.
#[async_trait]
pub trait TestRunner: Send {
    /// Prepare the acquired project for compilation (install dependencies,
    /// patch build files). Establishes the test directory for all later
    /// operations.
    async fn setup_environment(&mut self, test_dir: &Path) -> Result<()>;

    /// Reverse the side effects of `setup_environment`. Idempotent, and
    /// safe to call after a partial setup.
    async fn clean(&mut self) -> Result<()>;

    /// Apply resolved settings to the project's own build configuration for
    /// all given presets. Configuration only; no compilation is triggered.
    async fn compiler_settings(&self, solc_version: &str, presets: &[Preset]) -> Result<()>;

    /// Invoke the project's build step for one preset.
    async fn compile(&self, solc_version: &str, preset: Preset) -> Result<()>;

    /// Invoke the project's test step for one preset.
    async fn run_test(&self, preset: Preset) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_accessor_fails_before_setup() {
        let dir = TestDir::default();
        let err = dir.get().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: test directory not defined",
        );
    }

    #[test]
    fn test_dir_accessor_returns_set_path() {
        let mut dir = TestDir::default();
        dir.set(Path::new("/tmp/ext"));
        assert_eq!(dir.get().unwrap(), Path::new("/tmp/ext"));
    }
}
