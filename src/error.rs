//! Error types for the redoc library.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Result type alias for redoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while formatting a document package.
#[derive(Error, Debug)]
pub enum Error {
    /// No input was provided, or the input was empty.
    #[error("No file provided")]
    InputMissing,

    /// The input bytes could not be opened as a ZIP package.
    #[error("Malformed package: {0}")]
    MalformedPackage(String),

    /// A targeted part exists but its content is not well-formed XML.
    #[error("Malformed part {part}: {message}")]
    MalformedPart { part: String, message: String },

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other internal fault.
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

/// Coarse error classification reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InputMissing,
    MalformedPackage,
    MalformedPart,
    UnexpectedFailure,
}

impl Error {
    /// Classify this error.
    ///
    /// A bare [`Error::XmlParse`] only escapes the library when a caller
    /// parses a tree directly, so it is reported as a malformed part.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputMissing => ErrorKind::InputMissing,
            Error::MalformedPackage(_) => ErrorKind::MalformedPackage,
            Error::MalformedPart { .. } | Error::XmlParse(_) => ErrorKind::MalformedPart,
            Error::Io(_) | Error::Unexpected(_) => ErrorKind::UnexpectedFailure,
        }
    }

    /// Wrap a tree-level error with the name of the part it came from.
    pub(crate) fn in_part(self, part: &str) -> Self {
        match self {
            Error::XmlParse(message) => Error::MalformedPart {
                part: part.to_string(),
                message,
            },
            other => other,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::MalformedPackage(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
