//! External process execution
//!
//! Every external invocation blocks the driver until the child exits:
//! children are awaited to completion one at a time, with no timeout and no
//! retry. Output of build and test steps is inherited so the project's own
//! tooling prints directly to the user.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::common::{Error, Result};

/// Run a program with arguments in `cwd`, inheriting stdio.
pub async fn run_cmd(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    debug!(program, ?args, cwd = %cwd.display(), "running command");
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::CommandSpawn {
            command: program.to_string(),
            error: e,
        })?;

    if !status.success() {
        let command = format!("{} {}", program, args.join(" "));
        return Err(Error::command_failed(&command, status));
    }
    Ok(())
}

/// Run a shell line in `cwd` with extra environment variables.
///
/// Used for the external project's own commands, which are configured as
/// free-form shell text.
pub async fn run_shell(line: &str, cwd: &Path, envs: &[(&str, &str)]) -> Result<()> {
    debug!(line, cwd = %cwd.display(), "running shell command");
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(line)
        .current_dir(cwd)
        .stdin(Stdio::null());
    for (key, value) in envs {
        command.env(key, value);
    }

    let status = command.status().await.map_err(|e| Error::CommandSpawn {
        command: line.to_string(),
        error: e,
    })?;

    if !status.success() {
        return Err(Error::command_failed(line, status));
    }
    Ok(())
}

/// Run a program and capture its trimmed stdout.
///
/// The exit status is deliberately not checked: version queries are parsed
/// downstream and a garbled or empty output surfaces as a version parse
/// error carrying the raw text.
pub async fn capture_stdout(program: impl AsRef<OsStr>, args: &[&str]) -> Result<String> {
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::CommandSpawn {
            command: program.to_string_lossy().into_owned(),
            error: e,
        })?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
