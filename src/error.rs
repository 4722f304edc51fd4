use std::io;
use std::process::ExitStatus;
use thiserror::Error;

use crate::codec::radix::RadixError;

/// Errors raised by the pixel grid, its backends and the display adapter.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("radix codec error: {0}")]
    Radix(#[from] RadixError),

    /// Malformed stream from (or for) the protocol tool.
    #[error("protocol error at line {line}: {reason}")]
    Protocol { line: usize, reason: String },

    #[error("pixel ({x}, {y}) is outside a {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("pixel data holds {actual} values but the image needs {expected}")]
    DataLength { expected: usize, actual: usize },

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("`{tool}` exited with {status}")]
    ToolFailed { tool: String, status: ExitStatus },

    /// Failure inside the native imaging library.
    #[error("image codec error: {0}")]
    Codec(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn protocol(line: usize, reason: impl Into<String>) -> Self {
        Error::Protocol {
            line,
            reason: reason.into(),
        }
    }

    pub fn display(msg: impl Into<String>) -> Self {
        Error::Display(msg.into())
    }
}

#[cfg(feature = "native")]
impl From<::image::ImageError> for Error {
    fn from(err: ::image::ImageError) -> Self {
        match err {
            ::image::ImageError::IoError(e) => Error::Io(e),
            other => Error::Codec(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = Error::OutOfBounds {
            x: 5,
            y: 1,
            width: 3,
            height: 2,
        };
        assert_eq!(err.to_string(), "pixel (5, 1) is outside a 3x2 image");
    }

    #[test]
    fn test_protocol_helper_carries_line() {
        let err = Error::protocol(4, "expected 3 values, found 2");
        match err {
            Error::Protocol { line, reason } => {
                assert_eq!(line, 4);
                assert!(reason.contains("found 2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
