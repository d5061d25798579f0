//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: configuration error (out-of-range request field, unknown preset,
//!   palette mode or color)
//! - 11: I/O or encoding error (reading a spec file, writing the PNG)
//! - 12: persistence error (palette table unreadable or malformed)
//! - 13: serialization error (unparseable JSON request, unknown request
//!   field, JSON output)

use poster_engine_core::{ErrorKind, PosterError};
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// The poster request was rejected before anything was drawn.
    Config(PosterError),
    /// A file could not be read, or the PNG could not be written.
    Io(String),
    /// The palette table could not be created or loaded.
    Persistence(PosterError),
    /// A JSON request could not be parsed, or output could not be encoded.
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 10,
            CliError::Io(_) => 11,
            CliError::Persistence(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Short machine-readable class, reported in `--json` mode.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Config(_) => "configuration",
            CliError::Io(_) => "io",
            CliError::Persistence(_) => "persistence",
            CliError::Serialization(_) => "serialization",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) | CliError::Persistence(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<PosterError> for CliError {
    fn from(e: PosterError) -> Self {
        match e.kind() {
            ErrorKind::Configuration => CliError::Config(e),
            ErrorKind::Persistence => CliError::Persistence(e),
            ErrorKind::Encoding => CliError::Io(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
