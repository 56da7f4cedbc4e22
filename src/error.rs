//! Unified error type for cjk-typeset host operations.
//!
//! The fragment transforms themselves are total and never fail; errors only
//! arise at the edges (file I/O, XML parsing, EPUB archives). `From` impls
//! let `?` cross module boundaries.

use core::fmt;

/// Top-level error type for file- and archive-level operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum TypesetError {
    /// XML/XHTML parsing or serialization error.
    Parse(String),
    /// I/O error with the path it occurred on.
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// EPUB archive could not be opened or read.
    Epub(String),
    /// Path has an extension other than `.html`/`.xhtml`.
    UnsupportedExtension {
        /// Offending path.
        path: String,
    },
    /// Path does not exist or is neither a file nor a directory.
    InvalidPath {
        /// Offending path.
        path: String,
    },
    /// File content is not valid UTF-8.
    NotUtf8 {
        /// Offending path.
        path: String,
    },
}

impl fmt::Display for TypesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypesetError::Parse(msg) => write!(f, "Parse error: {}", msg),
            TypesetError::Io { path, source } => write!(f, "I/O error on '{}': {}", path, source),
            TypesetError::Epub(msg) => write!(f, "EPUB error: {}", msg),
            TypesetError::UnsupportedExtension { path } => {
                write!(
                    f,
                    "Invalid file extension for '{}': only .html and .xhtml are supported",
                    path
                )
            }
            TypesetError::InvalidPath { path } => write!(f, "Invalid path provided: '{}'", path),
            TypesetError::NotUtf8 { path } => {
                write!(f, "File content is not valid UTF-8: '{}'", path)
            }
        }
    }
}

impl std::error::Error for TypesetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TypesetError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for TypesetError {
    fn from(err: quick_xml::Error) -> Self {
        TypesetError::Parse(err.to_string())
    }
}

impl From<zip::result::ZipError> for TypesetError {
    fn from(err: zip::result::ZipError) -> Self {
        TypesetError::Epub(err.to_string())
    }
}

impl TypesetError {
    /// Wrap an `io::Error` with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        TypesetError::Io {
            path: path.into(),
            source,
        }
    }
}
