//! Compiler resolution and version parsing
//!
//! A native solc binary is queried for its version directly. A solc-js
//! binary (`soljson.js`) first needs the solc-js wrapper built around it:
//! the wrapper sources are cloned (or copied from a local override), built
//! with npm, and the provided binary is substituted into the build output
//! before the version query runs through node.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::common::{Error, Result};
use crate::config::{BinaryType, RefType, SolcConfig};
use crate::exec::{capture_stdout, run_cmd};
use crate::git::download_project;

/// Upstream solc-js sources, built when testing a solcjs binary.
const SOLCJS_REPO_URL: &str = "https://github.com/ethereum/solc-js.git";

/// Matches a version line: an optional label prefix followed by the version
/// string, which starts with a digit. Searched line-wise so both the
/// multi-line `solc --version` banner and a bare version string parse.
static FULL_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[a-zA-Z: ]*([0-9][^\r\n]*)$").expect("valid regex"));

/// Leading dotted-numeric token of a full version string, terminated by a
/// `+` or `-` separator or the end of the string.
static SHORT_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+)(?:[+-]|$)").expect("valid regex"));

/// Full and short forms of the compiler-under-test's version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolcVersion {
    /// e.g. `0.8.20+commit.abc123.Linux.g++`
    pub full: String,
    /// e.g. `0.8.20`
    pub short: String,
}

/// Extract the full version string from raw version-query output.
pub fn parse_solc_version(output: &str) -> Result<String> {
    FULL_VERSION_RE
        .captures(output)
        .map(|captures| captures[1].trim().to_string())
        .ok_or_else(|| Error::VersionParse {
            output: output.to_string(),
        })
}

/// Extract the short version from a full version string.
pub fn solc_short_version(full: &str) -> Result<String> {
    SHORT_VERSION_RE
        .captures(full)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| Error::ShortVersion {
            full: full.to_string(),
        })
}

/// Two-stage extraction of both version forms from raw query output.
pub fn version_from_output(output: &str) -> Result<SolcVersion> {
    let full = parse_solc_version(output)?;
    let short = solc_short_version(&full)?;
    Ok(SolcVersion { full, short })
}

/// Extension-based media type check for a solc-js binary. Matches what
/// mime-type tables report as `application/javascript`.
fn is_javascript(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("js" | "mjs" | "cjs")
    )
}

/// Resolve the compiler under test and query its version.
pub async fn setup_solc(config: &SolcConfig, test_dir: &Path) -> Result<SolcVersion> {
    let output = match config.binary_type {
        BinaryType::Solcjs => {
            let parent = test_dir.parent().ok_or_else(|| {
                Error::Acquisition(format!(
                    "test directory {} has no parent",
                    test_dir.display()
                ))
            })?;
            let solc_dir = parent.join(&config.install_dir);
            let solc_bin = solc_dir.join("dist/solc.js");

            println!("Setting up solc-js...");
            match &config.solcjs_src_dir {
                None => {
                    download_project(&solc_dir, SOLCJS_REPO_URL, RefType::Branch, &config.branch)
                        .await?;
                }
                Some(src_dir) => {
                    println!("Using local solc-js from {}...", src_dir.display());
                    copy_dir_recursive(src_dir, &solc_dir)?;
                    // Stale build artifacts would shadow the fresh build
                    remove_dir_if_exists(&solc_dir.join("dist"))?;
                    remove_dir_if_exists(&solc_dir.join("node_modules"))?;
                }
            }
            run_cmd("npm", &["install"], &solc_dir).await?;
            run_cmd("npm", &["run", "build"], &solc_dir).await?;

            if !is_javascript(&config.binary_path) {
                return Err(Error::WrongBinaryType(
                    "Provided soljson.js is expected to be of the type application/javascript \
                     but it is not."
                        .to_string(),
                ));
            }
            std::fs::copy(&config.binary_path, solc_dir.join("dist/soljson.js"))?;

            let solc_bin = solc_bin.display().to_string();
            capture_stdout("node", &[solc_bin.as_str(), "--version"]).await?
        }
        BinaryType::Native => {
            println!("Setting up solc...");
            capture_stdout(config.binary_path.as_os_str(), &["--version"]).await?
        }
    };

    version_from_output(&output)
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
