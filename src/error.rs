//! Error taxonomy for the stamp pipeline

use std::fmt::{self, Display};
use std::io;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Failures a pipeline request can surface to its caller.
///
/// An empty silhouette is deliberately *not* here: the contour generator
/// returns an empty [`Mesh`](crate::Mesh) for it, which callers treat as
/// "no exportable geometry".
#[derive(Debug)]
pub enum Error {
    /// The source bytes could not be decoded into an image
    Decode(String),
    /// Zero-sized buffer, or a buffer whose data length does not match its dimensions
    InvalidDimensions { width: u32, height: u32, len: usize },
    /// Writing the serialized mesh failed
    Export(io::Error),
    /// Reading or parsing a settings file failed
    Settings(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(s) => write!(f, "image decode error: {s}"),
            Error::InvalidDimensions { width, height, len } => write!(
                f,
                "invalid buffer dimensions: {width}x{height} with {len} bytes"
            ),
            Error::Export(e) => write!(f, "mesh export error: {e}"),
            Error::Settings(s) => write!(f, "settings error: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Export(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Export(e)
    }
}
