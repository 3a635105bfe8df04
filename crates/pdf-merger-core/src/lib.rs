//! PDF Merger Core Library
//!
//! This library provides the core functionality for merging PDF documents:
//! - Document loading with media-type validation
//! - Page concatenation into a freshly created document
//! - Serialization for preview/download artifacts
//! - Configuration loading

pub mod config;
pub mod error;
pub mod pdf;
pub mod util;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pdf::{
    concat, declared_media_type_for_path, load, merge, DocumentMetadata, PdfDocument,
    PDF_MEDIA_TYPE,
};

/// Convenience function for file-based front-ends: validate both paths by
/// extension, load them, and concatenate top-then-script.
pub fn merge_files(
    top_path: impl AsRef<std::path::Path>,
    script_path: impl AsRef<std::path::Path>,
) -> Result<PdfDocument> {
    let load_path = |path: &std::path::Path| -> Result<PdfDocument> {
        let declared = declared_media_type_for_path(path);
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let bytes = std::fs::read(path)?;
        load(bytes, &declared, &file_name)
    };

    let top = load_path(top_path.as_ref())?;
    let script = load_path(script_path.as_ref())?;
    merge(&top, &script)
}
