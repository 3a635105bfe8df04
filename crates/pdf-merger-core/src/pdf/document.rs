use std::path::Path;
use std::sync::Arc;

use lopdf::{Document, Object};

use crate::error::{Error, Result};

/// Thread-safe wrapper around a parsed PDF document
pub struct PdfDocument {
    /// The raw PDF bytes (kept for re-opening and artifact publishing)
    bytes: Arc<Vec<u8>>,
    /// Cached metadata
    metadata: DocumentMetadata,
    /// Number of pages
    page_count: usize,
    /// Content fingerprint (MD5 hex), computed once on load
    fingerprint: String,
}

/// Document metadata from the Info dictionary
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
}

impl PdfDocument {
    /// Open a PDF from bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();

        // Open document to extract metadata and page count
        let doc = Document::load_mem(&bytes)
            .map_err(|e| Error::ParseFailure(format!("Failed to parse PDF: {e}")))?;

        let page_count = doc.get_pages().len();
        let metadata = extract_metadata(&doc);
        let fingerprint = format!("{:x}", md5::compute(&bytes));

        Ok(Self {
            bytes: Arc::new(bytes),
            metadata,
            page_count,
            fingerprint,
        })
    }

    /// Open a PDF from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            Error::ParseFailure(format!(
                "Failed to read file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_bytes(bytes)
    }

    /// Get document metadata
    pub const fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Get number of pages
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Get raw PDF bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get raw PDF bytes as a reference-counted pointer.
    ///
    /// Use this when you need to share the bytes across threads or store them
    /// without copying. This is an O(1) operation that only increments the
    /// reference count.
    pub fn bytes_arc(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    /// Open the document for operations (creates a temporary handle)
    ///
    /// The bytes already parsed once at load, so a failure here is an engine
    /// error rather than a user-facing validation failure.
    pub(crate) fn open_document(&self) -> Result<Document> {
        Document::load_mem(&self.bytes)
            .map_err(|e| Error::Lopdf(format!("Failed to open document: {e}")))
    }

    /// Serialize the document through the engine's save path.
    ///
    /// Produces a normalized byte stream rather than echoing the input bytes,
    /// so a corrupted in-memory structure surfaces here instead of at the
    /// consumer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut doc = self.open_document()?;
        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| Error::Serialization(format!("Failed to save PDF: {e}")))?;

        Ok(output)
    }

    /// ETag/cache key component derived from document content.
    ///
    /// MD5 hash of the PDF bytes, computed once on load.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Pull title/author/producer out of the trailer's Info dictionary, if any.
fn extract_metadata(doc: &Document) -> DocumentMetadata {
    let info_dict = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| match obj {
            Object::Reference(id) => doc.get_object(*id).ok(),
            direct => Some(direct),
        })
        .and_then(|obj| obj.as_dict().ok());

    let get_text = |key: &[u8]| -> Option<String> {
        info_dict
            .and_then(|dict| dict.get(key).ok())
            .and_then(|obj| obj.as_str().ok())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .filter(|s| !s.is_empty())
    };

    DocumentMetadata {
        title: get_text(b"Title"),
        author: get_text(b"Author"),
        producer: get_text(b"Producer"),
    }
}

impl Clone for PdfDocument {
    /// Clone the document efficiently.
    ///
    /// This is O(1) - it only clones the `Arc` pointer to the underlying bytes,
    /// not the bytes themselves. The metadata is also cloned (small struct).
    fn clone(&self) -> Self {
        Self {
            bytes: Arc::clone(&self.bytes),
            metadata: self.metadata.clone(),
            page_count: self.page_count,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_count)
            .field("metadata", &self.metadata)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pdf::test_support::test_pdf;

    #[test]
    fn test_from_bytes_counts_pages() {
        let doc = PdfDocument::from_bytes(test_pdf(&["One", "Two", "Three"])).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = PdfDocument::from_bytes(b"not a pdf at all".to_vec());
        assert!(matches!(result, Err(Error::ParseFailure(_))));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let bytes = test_pdf(&["Same"]);
        let a = PdfDocument::from_bytes(bytes.clone()).unwrap();
        let b = PdfDocument::from_bytes(bytes).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = PdfDocument::from_bytes(test_pdf(&["Different"])).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_serialize_roundtrips() {
        let doc = PdfDocument::from_bytes(test_pdf(&["A", "B"])).unwrap();
        let bytes = doc.serialize().unwrap();
        let reloaded = PdfDocument::from_bytes(bytes).unwrap();
        assert_eq!(reloaded.page_count(), 2);
    }

    #[test]
    fn test_clone_shares_bytes() {
        let doc = PdfDocument::from_bytes(test_pdf(&["A"])).unwrap();
        let clone = doc.clone();
        assert_eq!(doc.bytes().as_ptr(), clone.bytes().as_ptr());
        assert_eq!(doc.page_count(), clone.page_count());
    }
}
