//! Node environment preparation
//!
//! Projects with a nodejs build dependency need their lock files removed
//! (they would pin dependency versions over our configuration changes) and
//! their package manifest's publish hooks neutralized before installation.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::common::{Error, Result};

static PREPUBLISH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("prepublish":)\s*"[^"]*""#).expect("valid regex"));
static PREPARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("prepare":)\s*"[^"]*""#).expect("valid regex"));

/// Blank the `prepublish` and `prepare` lifecycle hooks in package manifest
/// text. All other content is preserved byte for byte.
pub fn disable_package_hooks(manifest: &str) -> String {
    let patched = PREPUBLISH_RE.replace_all(manifest, "${1} \"\"");
    PREPARE_RE.replace_all(&patched, "${1} \"\"").into_owned()
}

/// Prepare an acquired project for its nodejs toolchain.
pub fn prepare_node_env(test_dir: &Path) -> Result<()> {
    if which::which("node").is_err() {
        return Err(Error::MissingDependency("nodejs not found".to_string()));
    }

    println!("Removing package lock files...");
    remove_file_if_exists(&test_dir.join("yarn.lock"))?;
    remove_file_if_exists(&test_dir.join("package_lock.json"))?;

    println!("Disabling package.json hooks...");
    let manifest_path = test_dir.join("package.json");
    if !manifest_path.exists() {
        return Err(Error::MissingDependency("package.json not found".to_string()));
    }
    let manifest = std::fs::read_to_string(&manifest_path)
        .map_err(|e| Error::file_read(&manifest_path, &e))?;
    std::fs::write(&manifest_path, disable_package_hooks(&manifest))?;
    Ok(())
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
