//! Test definition loading and validation
//!
//! A test definition describes one external project target: where to fetch
//! it, which revision, which presets to run, and which of the project's own
//! commands drive its build and test steps. Definitions are loaded from a
//! TOML file into typed structs in one explicit pass; the compiler binary
//! type and path are injected from the command line afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::{Error, Result};
use crate::presets::{Preset, CURRENT_EVM_VERSION};

/// Kind of compiler binary under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BinaryType {
    /// Native solc executable
    Native,
    /// solc-js `soljson.js` emscripten build, run through node
    Solcjs,
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryType::Native => write!(f, "native"),
            BinaryType::Solcjs => write!(f, "solcjs"),
        }
    }
}

/// Kind of git reference selecting the project revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Commit,
    Branch,
    Tag,
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefType::Commit => write!(f, "commit"),
            RefType::Branch => write!(f, "branch"),
            RefType::Tag => write!(f, "tag"),
        }
    }
}

/// Compiler binary description: CLI-provided binary plus the `[solc]`
/// section of the test definition.
#[derive(Debug, Clone)]
pub struct SolcConfig {
    pub binary_type: BinaryType,
    pub binary_path: PathBuf,
    /// solc-js branch to build when no local source override is given
    pub branch: String,
    /// Directory name for the solc-js checkout, sibling of the test directory
    pub install_dir: String,
    /// Local solc-js source tree used instead of cloning upstream
    pub solcjs_src_dir: Option<PathBuf>,
}

/// The `[solc]` table of a test definition file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SolcSection {
    pub branch: String,
    pub install_dir: String,
    pub solcjs_src_dir: Option<PathBuf>,
}

impl Default for SolcSection {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            install_dir: "solc".to_string(),
            solcjs_src_dir: None,
        }
    }
}

/// The `[project]` table of a test definition file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub repo_url: String,
    pub ref_type: RefType,
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Presets whose test step is skipped
    #[serde(default)]
    pub compile_only_presets: Vec<Preset>,
    /// Presets that run both the compile and the test step
    #[serde(default)]
    pub settings_presets: Vec<Preset>,
    #[serde(default = "default_build_dependency")]
    pub build_dependency: String,
    #[serde(default = "default_evm_version")]
    pub evm_version: String,
}

fn default_build_dependency() -> String {
    "nodejs".to_string()
}

fn default_evm_version() -> String {
    CURRENT_EVM_VERSION.to_string()
}

/// The `[commands]` table: the external project's own build and test
/// commands, run with `sh -c` inside the test directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerCommands {
    /// Commands run once during environment setup (dependency installation,
    /// build-file patching)
    #[serde(default)]
    pub setup: Vec<String>,
    /// Per-preset compile command; sees `SOLC_VERSION` and `PRESET`
    pub compile: String,
    /// Per-preset test command; sees `PRESET`
    pub test: String,
    /// Directory (relative to the test directory) receiving the resolved
    /// per-preset settings files
    #[serde(default = "default_settings_dir")]
    pub settings_dir: String,
}

fn default_settings_dir() -> String {
    "exttest-settings".to_string()
}

/// Raw shape of a test definition file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestDefinition {
    pub name: String,
    pub project: ProjectConfig,
    #[serde(default)]
    pub solc: SolcSection,
    pub commands: RunnerCommands,
}

/// A validated description of one external-project test target.
///
/// Immutable for the duration of one run.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub name: String,
    pub project: ProjectConfig,
    pub solc: SolcConfig,
    pub commands: RunnerCommands,
}

impl TestConfig {
    /// Load a test definition file and combine it with the CLI-provided
    /// compiler binary description.
    pub fn load(path: &Path, binary_type: BinaryType, binary_path: PathBuf) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        let definition: TestDefinition =
            toml::from_str(&text).map_err(|e| Error::ConfigParse(e.to_string()))?;
        Ok(Self::from_definition(definition, binary_type, binary_path))
    }

    pub fn from_definition(
        definition: TestDefinition,
        binary_type: BinaryType,
        binary_path: PathBuf,
    ) -> Self {
        Self {
            name: definition.name,
            project: definition.project,
            solc: SolcConfig {
                binary_type,
                binary_path,
                branch: definition.solc.branch,
                install_dir: definition.solc.install_dir,
                solcjs_src_dir: definition.solc.solcjs_src_dir,
            },
            commands: definition.commands,
        }
    }

    /// Union of compile-only and settings presets, de-duplicated and ordered
    /// by catalog declaration order.
    pub fn selected_presets(&self) -> Vec<Preset> {
        let mut presets: Vec<Preset> = self
            .project
            .compile_only_presets
            .iter()
            .chain(&self.project.settings_presets)
            .copied()
            .collect();
        presets.sort();
        presets.dedup();
        presets
    }

    /// Whether the test step is skipped for this preset
    pub fn is_compile_only(&self, preset: Preset) -> bool {
        self.project.compile_only_presets.contains(&preset)
    }

    /// Check cross-field invariants before any side effect.
    ///
    /// A local solc-js source override only makes sense when the binary under
    /// test is a solc-js build.
    pub fn validate(&self) -> Result<()> {
        if self.solc.binary_type != BinaryType::Solcjs {
            if let Some(dir) = &self.solc.solcjs_src_dir {
                return Err(Error::Config(format!(
                    "'native' mode cannot be used with 'solcjs_src_dir'. \
                     Please use 'binary_type: solcjs' or unset: 'solcjs_src_dir: {}'",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(toml_text: &str) -> TestDefinition {
        toml::from_str(toml_text).unwrap()
    }

    fn minimal() -> &'static str {
        r#"
            name = "sample"

            [project]
            repo_url = "https://example.com/sample.git"
            ref_type = "branch"
            ref = "main"
            settings_presets = ["legacy-no-optimize"]

            [commands]
            compile = "npm run build"
            test = "npm test"
        "#
    }

    fn config_from(toml_text: &str) -> TestConfig {
        TestConfig::from_definition(
            definition(toml_text),
            BinaryType::Native,
            PathBuf::from("/usr/bin/solc"),
        )
    }

    #[test]
    fn defaults_are_applied() {
        let config = config_from(minimal());
        assert_eq!(config.project.build_dependency, "nodejs");
        assert_eq!(config.project.evm_version, CURRENT_EVM_VERSION);
        assert_eq!(config.solc.branch, "master");
        assert_eq!(config.solc.install_dir, "solc");
        assert_eq!(config.commands.settings_dir, "exttest-settings");
        assert!(config.solc.solcjs_src_dir.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: std::result::Result<TestDefinition, _> = toml::from_str(
            r#"
                name = "sample"
                surprise = true

                [project]
                repo_url = "https://example.com/sample.git"
                ref_type = "branch"
                ref = "main"

                [commands]
                compile = "true"
                test = "true"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn invalid_ref_type_is_rejected() {
        let result: std::result::Result<TestDefinition, _> =
            toml::from_str(&minimal().replace("\"branch\"", "\"revision\""));
        assert!(result.is_err());
    }

    #[test]
    fn selected_presets_dedupes_and_orders() {
        let mut config = config_from(minimal());
        config.project.compile_only_presets =
            vec![Preset::IrOptimizeEvmYul, Preset::LegacyNoOptimize];
        config.project.settings_presets =
            vec![Preset::LegacyNoOptimize, Preset::IrNoOptimize];
        assert_eq!(
            config.selected_presets(),
            vec![
                Preset::LegacyNoOptimize,
                Preset::IrNoOptimize,
                Preset::IrOptimizeEvmYul,
            ],
        );
    }

    #[test]
    fn selected_presets_is_input_order_independent() {
        let mut a = config_from(minimal());
        a.project.compile_only_presets = vec![Preset::IrNoOptimize, Preset::LegacyNoOptimize];
        a.project.settings_presets = vec![];
        let mut b = config_from(minimal());
        b.project.compile_only_presets = vec![];
        b.project.settings_presets = vec![Preset::LegacyNoOptimize, Preset::IrNoOptimize];
        assert_eq!(a.selected_presets(), b.selected_presets());
    }

    #[test]
    fn native_with_solcjs_src_dir_is_rejected() {
        let mut config = config_from(minimal());
        config.solc.solcjs_src_dir = Some(PathBuf::from("/src/solc-js"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("solcjs_src_dir"));
    }

    #[test]
    fn solcjs_with_src_dir_is_accepted() {
        let mut config = TestConfig::from_definition(
            definition(minimal()),
            BinaryType::Solcjs,
            PathBuf::from("/tmp/soljson.js"),
        );
        config.solc.solcjs_src_dir = Some(PathBuf::from("/src/solc-js"));
        assert!(config.validate().is_ok());
    }
}
