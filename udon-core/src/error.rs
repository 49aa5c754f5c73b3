//! Hard failures.
//!
//! Malformed notation never fails a parse; it is reported in-stream as
//! [`Event::Error`](crate::Event::Error). The only thing that stops the
//! engine from producing events is input it cannot read as text.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input is not valid UTF-8. Nothing was parsed.
    Encoding {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Encoding { valid_up_to } => {
                write!(f, "invalid UTF-8 after byte {}", valid_up_to)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding { valid_up_to: err.valid_up_to() }
    }
}
