//! Error types for the external test driver
//!
//! Every failure in the orchestration protocol is fatal: errors propagate to
//! the caller unchanged, nothing is retried, and the working directory is
//! torn down before the error surfaces.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the external test driver
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid test definition file: {0}")]
    ConfigParse(String),

    // === Compiler Resolution Errors ===
    #[error("Wrong binary type: {0}")]
    WrongBinaryType(String),

    #[error("Solc version could not be found in: {output}")]
    VersionParse { output: String },

    #[error("Error extracting short version string from: {full}")]
    ShortVersion { full: String },

    // === Project Acquisition Errors ===
    #[error("Failed to acquire project sources: {0}")]
    Acquisition(String),

    // === Environment Errors ===
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    // === Process Errors ===
    #[error("Command '{command}' failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("Failed to spawn '{command}': {error}")]
    CommandSpawn { command: String, error: io::Error },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a command failure error
    pub fn command_failed(command: &str, status: ExitStatus) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            status,
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
