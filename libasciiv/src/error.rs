//! Error types for reading and playing ASCII videos.

use std::{error::Error, fmt, io, path::PathBuf};

/// Errors that can occur while opening or playing an ASCII video.
#[derive(Debug)]
pub enum PlayerError {
    /// The input file could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Reading the frame stream or writing to the terminal failed.
    Io(io::Error),

    /// The speed multiplier was not a finite number above zero.
    InvalidSpeed(f64),

    /// A frame rate of zero was requested.
    InvalidRate,
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Cannot open file {}: {source}", path.display())
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::InvalidSpeed(speed) => write!(
                f,
                "Invalid speed factor {speed}. It must be a positive number."
            ),
            Self::InvalidRate => write!(f, "The frame rate must be at least 1"),
        }
    }
}

impl Error for PlayerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::InvalidSpeed(_) | Self::InvalidRate => None,
        }
    }
}

impl From<io::Error> for PlayerError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
