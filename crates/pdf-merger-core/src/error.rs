use thiserror::Error;

/// Unified error type for pdf-merger-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Document loading (media type validation, parsing)
/// - Merge operations (input preconditions, object assembly)
/// - Serialization (producing preview/download artifacts)
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Loading Errors
    // ==========================================================================
    /// Selected file does not declare the PDF media type
    #[error("selected file [{file_name}] is not a PDF (got {media_type})")]
    UnsupportedFileType {
        file_name: String,
        media_type: String,
    },

    /// File declares the PDF media type but cannot be parsed
    #[error("failed to parse PDF: {0}")]
    ParseFailure(String),

    // ==========================================================================
    // Merge Errors
    // ==========================================================================
    /// Merge requested without both input documents present
    #[error("please choose the top page and the script page first to merge")]
    MissingInputs,

    /// Merge invoked with no source documents at all
    #[error("no documents to merge")]
    EmptyMerge,

    /// Error from the lopdf library
    #[error("lopdf error: {0}")]
    Lopdf(String),

    // ==========================================================================
    // Serialization Errors
    // ==========================================================================
    /// Failed to serialize a document to bytes
    #[error("failed to serialize PDF: {0}")]
    Serialization(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
