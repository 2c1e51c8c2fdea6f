//! Git operations for project acquisition
//!
//! Commit refs cannot be cloned directly, so they are materialized with
//! init + shallow fetch + hard reset; branch and tag refs use a shallow
//! clone. Submodules are initialized when the project declares any.

use std::path::Path;

use crate::common::{Error, Result};
use crate::config::RefType;
use crate::exec::{capture_stdout, run_cmd};

/// Run a git subcommand in `cwd`.
pub async fn git(cwd: &Path, args: &[&str]) -> Result<()> {
    run_cmd("git", args, cwd).await
}

/// Commit hash of HEAD in `dir`.
pub async fn commit_hash(dir: &Path) -> Result<String> {
    let dir = dir.display().to_string();
    capture_stdout("git", &["-C", dir.as_str(), "rev-parse", "HEAD"]).await
}

/// Materialize the requested revision of `repo_url` into `test_dir`.
pub async fn download_project(
    test_dir: &Path,
    repo_url: &str,
    ref_type: RefType,
    git_ref: &str,
) -> Result<()> {
    println!("Cloning {ref_type} {git_ref} of {repo_url}...");

    match ref_type {
        RefType::Commit => {
            std::fs::create_dir(test_dir)?;
            git(test_dir, &["init"]).await?;
            git(test_dir, &["remote", "add", "origin", repo_url]).await?;
            git(test_dir, &["fetch", "--depth", "1", "origin", git_ref]).await?;
            git(test_dir, &["reset", "--hard", "FETCH_HEAD"]).await?;
        }
        RefType::Branch | RefType::Tag => {
            let parent = test_dir.parent().ok_or_else(|| {
                Error::Acquisition(format!(
                    "test directory {} has no parent",
                    test_dir.display()
                ))
            })?;
            let target = test_dir.display().to_string();
            git(
                parent,
                &["clone", "--depth", "1", repo_url, "-b", git_ref, &target],
            )
            .await?;
            if !test_dir.exists() {
                return Err(Error::Acquisition("git clone failed".to_string()));
            }
        }
    }

    if test_dir.join(".gitmodules").exists() {
        git(test_dir, &["submodule", "update", "--init"]).await?;
    }

    println!("Current commit hash: {}", commit_hash(test_dir).await?);
    Ok(())
}
