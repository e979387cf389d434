/*!
 * Error types for the doctranslate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, mutating or writing a document package
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The zip container could not be read or written
    #[error("Package error: {0}")]
    Package(#[from] zip::result::ZipError),

    /// A markup part is not well-formed XML
    #[error("Malformed markup in {part}: {message}")]
    Markup {
        /// Part name inside the package
        part: String,
        /// Parser message
        message: String,
    },

    /// A part required to build the object model is absent
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// An individual node could not be rewritten
    #[error("Node mutation failure on <{node}>: {reason}")]
    NodeMutationFailure {
        /// Qualified element name
        node: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the PDF converter collaborator
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter program could not be started
    #[error("Failed to launch converter '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but reported failure
    #[error("Converter exited with {status}: {stderr}")]
    Failed {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The converter claimed success but produced nothing
    #[error("Converter produced no output at {0:?}")]
    MissingOutput(PathBuf),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Input directory or mapping file is missing
    #[error("Resource not found: {0:?}")]
    ResourceNotFound(PathBuf),

    /// PDF to document conversion failed for one file
    #[error("Conversion failure: {0}")]
    ConversionFailure(#[from] ConversionError),

    /// The translated document could not be saved
    #[error("Persistence failure for {path:?}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    /// The document could not be loaded
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
