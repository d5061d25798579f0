//! Error types for the poster-engine core.

use std::path::PathBuf;

use thiserror::Error;

/// Broad failure class of a [`PosterError`].
///
/// Configuration errors are rejected before anything is drawn, persistence
/// errors come from the palette table, encoding errors from image export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Persistence,
    Encoding,
}

/// Errors produced while generating or exporting a poster.
#[derive(Debug, Error)]
pub enum PosterError {
    /// Blob parameters cannot produce a polygon (e.g. fewer than 3 points).
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A poster request field is out of range or inconsistent.
    #[error("invalid poster spec: {0}")]
    Validation(String),

    /// Palette mode name was not recognized.
    #[error("unknown palette mode: {0}")]
    UnknownPaletteMode(String),

    /// Style preset name was not recognized.
    #[error("unknown style preset: {0}")]
    UnknownPreset(String),

    /// Hue band name was not recognized.
    #[error("unknown hue band: {0}")]
    UnknownHueBand(String),

    /// Canvas width or height was zero or too large.
    #[error("invalid dimensions: width and height must be non-zero and at most {max} px")]
    InvalidDimensions { max: u32 },

    /// A color string or channel could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// The persisted palette table exists but is malformed.
    #[error("palette table {}:{line}: {reason}", .path.display())]
    Persistence {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// File system failure while reading or writing the palette table.
    #[error("i/o error: {0}")]
    Io(String),

    /// Image export failed.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl PosterError {
    /// Classifies the error into configuration, persistence, or encoding.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PosterError::Persistence { .. } | PosterError::Io(_) => ErrorKind::Persistence,
            PosterError::Encoding(_) => ErrorKind::Encoding,
            _ => ErrorKind::Configuration,
        }
    }

    pub(crate) fn persistence(path: &std::path::Path, line: usize, reason: impl Into<String>) -> Self {
        PosterError::Persistence {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for PosterError {
    fn from(e: std::io::Error) -> Self {
        PosterError::Io(e.to_string())
    }
}
