//! Document loading with media-type validation.
//!
//! The loader is the single entry point for turning user-selected bytes into
//! a [`PdfDocument`]. It checks the declared media type before handing the
//! bytes to the engine, so a mis-selected file fails with a message naming
//! the file instead of a parser error.

use std::path::Path;

use crate::error::{Error, Result};
use crate::pdf::PdfDocument;

/// The only media type the loader accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Validate the declared media type and parse the bytes into a document.
///
/// `file_name` is carried into the error for user display; it plays no role
/// in validation. The caller is responsible for assigning the returned
/// handle to a slot.
pub fn load(bytes: Vec<u8>, declared_media_type: &str, file_name: &str) -> Result<PdfDocument> {
    if declared_media_type != PDF_MEDIA_TYPE {
        return Err(Error::UnsupportedFileType {
            file_name: file_name.to_string(),
            media_type: declared_media_type.to_string(),
        });
    }

    let doc = PdfDocument::from_bytes(bytes)?;
    tracing::info!(
        "Loaded {} ({} pages, {})",
        file_name,
        doc.page_count(),
        crate::util::human_size(doc.bytes().len())
    );

    Ok(doc)
}

/// Declared media type for a filesystem path, derived from the extension.
///
/// Files without a recognizable extension get `application/octet-stream`,
/// which [`load`] will reject the same way a browser upload with the wrong
/// type is rejected.
pub fn declared_media_type_for_path(path: impl AsRef<Path>) -> String {
    mime_guess::from_path(path.as_ref())
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}
