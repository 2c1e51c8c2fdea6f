//! Generic command-driven test runner
//!
//! Drives an external project through its own commands, as configured in
//! the test definition file. The driver owns none of the project's build
//! pipeline: setup, compile, and test are free-form shell lines run inside
//! the test directory, with the resolved compiler version and preset name
//! exported in the environment. Resolved settings are written to one JSON
//! file per preset for the project's tooling to pick up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::common::Result;
use crate::config::RunnerCommands;
use crate::exec::run_shell;
use crate::presets::{settings_from_preset, Preset};

use super::{TestDir, TestRunner};

pub struct CommandRunner {
    commands: RunnerCommands,
    evm_version: String,
    test_dir: TestDir,
}

impl CommandRunner {
    pub fn new(commands: RunnerCommands, evm_version: String) -> Self {
        Self {
            commands,
            evm_version,
            test_dir: TestDir::default(),
        }
    }

    fn settings_dir(&self) -> Result<PathBuf> {
        Ok(self.test_dir.get()?.join(&self.commands.settings_dir))
    }
}

#[async_trait]
impl TestRunner for CommandRunner {
    async fn setup_environment(&mut self, test_dir: &Path) -> Result<()> {
        self.test_dir.set(test_dir);
        let dir = self.test_dir.get()?.to_path_buf();
        for line in &self.commands.setup {
            run_shell(line, &dir, &[]).await?;
        }
        Ok(())
    }

    async fn clean(&mut self) -> Result<()> {
        let settings_dir = self.settings_dir()?;
        match std::fs::remove_dir_all(&settings_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn compiler_settings(&self, solc_version: &str, presets: &[Preset]) -> Result<()> {
        let dir = self.settings_dir()?;
        std::fs::create_dir_all(&dir)?;
        for &preset in presets {
            let settings = settings_from_preset(preset, &self.evm_version);
            let path = dir.join(format!("{preset}.json"));
            debug!(%preset, solc_version, path = %path.display(), "writing settings");
            std::fs::write(&path, serde_json::to_string_pretty(&settings)?)?;
        }
        Ok(())
    }

    async fn compile(&self, solc_version: &str, preset: Preset) -> Result<()> {
        let dir = self.test_dir.get()?.to_path_buf();
        run_shell(
            &self.commands.compile,
            &dir,
            &[("SOLC_VERSION", solc_version), ("PRESET", preset.name())],
        )
        .await
    }

    async fn run_test(&self, preset: Preset) -> Result<()> {
        let dir = self.test_dir.get()?.to_path_buf();
        run_shell(&self.commands.test, &dir, &[("PRESET", preset.name())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn commands() -> RunnerCommands {
        toml::from_str(
            r#"
                setup = ["echo ready > setup-ran.txt"]
                compile = "printf %s \"$SOLC_VERSION/$PRESET\" >> compiled.txt"
                test = "printf %s \"$PRESET\" >> tested.txt"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn operations_before_setup_fail() {
        let runner = CommandRunner::new(commands(), "london".to_string());
        let err = runner
            .compile("0.8.20", Preset::LegacyNoOptimize)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("test directory not defined"));
    }

    #[tokio::test]
    async fn setup_runs_configured_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new(commands(), "london".to_string());
        runner.setup_environment(dir.path()).await.unwrap();
        assert!(dir.path().join("setup-ran.txt").exists());
    }

    #[tokio::test]
    async fn compiler_settings_writes_one_file_per_preset() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new(commands(), "london".to_string());
        runner.setup_environment(dir.path()).await.unwrap();
        runner
            .compiler_settings("0.8.20", &[Preset::IrNoOptimize, Preset::LegacyOptimizeEvmYul])
            .await
            .unwrap();

        let settings_dir = dir.path().join("exttest-settings");
        let written = std::fs::read_to_string(settings_dir.join("ir-no-optimize.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["viaIR"], true);
        assert_eq!(json["optimizer"]["enabled"], false);
        assert!(settings_dir.join("legacy-optimize-evm+yul.json").exists());
    }

    #[tokio::test]
    async fn compile_and_test_export_preset_environment() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new(commands(), "london".to_string());
        runner.setup_environment(dir.path()).await.unwrap();
        runner
            .compile("0.8.20", Preset::IrOptimizeEvmOnly)
            .await
            .unwrap();
        runner.run_test(Preset::IrOptimizeEvmOnly).await.unwrap();

        let compiled = std::fs::read_to_string(dir.path().join("compiled.txt")).unwrap();
        assert_eq!(compiled, "0.8.20/ir-optimize-evm-only");
        let tested = std::fs::read_to_string(dir.path().join("tested.txt")).unwrap();
        assert_eq!(tested, "ir-optimize-evm-only");
    }

    #[tokio::test]
    async fn clean_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = CommandRunner::new(commands(), "london".to_string());
        runner.setup_environment(dir.path()).await.unwrap();
        runner
            .compiler_settings("0.8.20", &[Preset::LegacyNoOptimize])
            .await
            .unwrap();
        runner.clean().await.unwrap();
        assert!(!dir.path().join("exttest-settings").exists());
        runner.clean().await.unwrap();
    }
}
