//! Page concatenation into a freshly created document.
//!
//! The merge never mutates its sources: every source's object graph is
//! renumbered into a disjoint ID range and imported into a new document,
//! which gets its own Pages tree and Catalog over exactly the imported
//! pages. Page content is copied at container level, never re-encoded.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::pdf::PdfDocument;

/// Page-tree attributes a page may inherit from its ancestors.
///
/// Source page trees are discarded by the merge, so anything inheritable
/// must be pulled down onto the page dictionaries first.
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Concatenate two documents: all pages of `top`, then all pages of `script`.
///
/// Both inputs must be present; the orchestrating layer reports missing
/// inputs to the user before this is ever called.
pub fn merge(top: &PdfDocument, script: &PdfDocument) -> Result<PdfDocument> {
    concat(&[top, script])
}

/// Concatenate any number of documents in argument order.
///
/// The resulting page count is the sum of the source page counts, and page
/// order within each source is preserved. Either the full concatenation
/// succeeds or an error is returned with no effect on the sources.
pub fn concat(sources: &[&PdfDocument]) -> Result<PdfDocument> {
    if sources.is_empty() {
        return Err(Error::EmptyMerge);
    }

    if sources.len() == 1 {
        return Ok((*sources[0]).clone());
    }

    let mut max_id: u32 = 1;
    // Pages in final order; a Vec rather than an ID-keyed map so the
    // top-then-script order holds by construction.
    let mut page_objects: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut carried_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut document = Document::with_version("1.5");

    for source in sources {
        let mut doc = source.open_document()?;

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by 1-based page number, so iterating values
        // follows the source's page order.
        for page_id in doc.get_pages().into_values() {
            let Ok(page_obj) = doc.get_object(page_id) else {
                continue;
            };
            let Ok(dict) = page_obj.as_dict() else {
                continue;
            };

            let mut dict = dict.clone();
            pull_inherited_attributes(&doc, &mut dict);
            page_objects.push((page_id, dict));
        }

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline" => {}
                _ => {
                    carried_objects.insert(object_id, object);
                }
            }
        }
    }

    for (object_id, object) in carried_objects {
        document.objects.insert(object_id, object);
    }

    // Inserting into objects directly does not advance max_id; without this,
    // new_object_id would hand out IDs that collide with imported objects.
    document.max_id = max_id;

    let pages_id = document.new_object_id();

    for (object_id, dict) in &mut page_objects {
        dict.set("Parent", Object::Reference(pages_id));
        document
            .objects
            .insert(*object_id, Object::Dictionary(dict.clone()));
    }

    let kids: Vec<Object> = page_objects
        .iter()
        .map(|(id, _)| Object::Reference(*id))
        .collect();
    let total_pages = i64::try_from(page_objects.len()).unwrap_or(0);

    let pages_dict = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(total_pages)),
    ]);
    document
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = document.new_object_id();
    let catalog_dict = Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    document
        .objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));

    document.trailer.set("Root", Object::Reference(catalog_id));

    #[allow(clippy::cast_possible_truncation)]
    let new_max_id = document.objects.len() as u32;
    document.max_id = new_max_id;

    document.renumber_objects();
    document.compress();

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|e| Error::Serialization(format!("Failed to save merged PDF: {e}")))?;

    let merged = PdfDocument::from_bytes(output)?;
    tracing::info!(
        "Merged {} documents into {} pages",
        sources.len(),
        merged.page_count()
    );

    Ok(merged)
}

/// Copy inheritable attributes from the page's ancestor chain onto the page
/// itself, for any the page does not set directly.
fn pull_inherited_attributes(doc: &Document, page: &mut Dictionary) {
    for key in INHERITABLE_PAGE_KEYS {
        if page.get(key).is_ok() {
            continue;
        }
        if let Some(value) = find_inherited(doc, page, key) {
            page.set(key, value);
        }
    }
}

/// Walk the Parent chain looking for `key`, nearest ancestor first.
fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page
        .get(b"Parent")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    while let Some(parent_id) = parent {
        let dict = doc.get_object(parent_id).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        parent = dict
            .get(b"Parent")
            .ok()
            .and_then(|obj| obj.as_reference().ok());
    }

    None
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{page_texts, test_pdf};

    fn doc(texts: &[&str]) -> PdfDocument {
        PdfDocument::from_bytes(test_pdf(texts)).unwrap()
    }

    #[test]
    fn test_merge_page_count_is_sum() {
        let top = doc(&["T1", "T2", "T3"]);
        let script = doc(&["S1", "S2"]);

        let merged = merge(&top, &script).unwrap();
        assert_eq!(merged.page_count(), 5);
    }

    #[test]
    fn test_merge_preserves_page_order() {
        let top = doc(&["T1", "T2", "T3"]);
        let script = doc(&["S1", "S2"]);

        let merged = merge(&top, &script).unwrap();
        assert_eq!(
            page_texts(merged.bytes()),
            vec!["T1", "T2", "T3", "S1", "S2"]
        );
    }

    #[test]
    fn test_merge_leaves_sources_untouched() {
        let top = doc(&["T1"]);
        let script = doc(&["S1"]);
        let top_fingerprint = top.fingerprint().to_string();

        let _ = merge(&top, &script).unwrap();
        assert_eq!(top.page_count(), 1);
        assert_eq!(top.fingerprint(), top_fingerprint);
    }

    #[test]
    fn test_merge_single_page_documents() {
        let merged = merge(&doc(&["A"]), &doc(&["B"])).unwrap();
        assert_eq!(merged.page_count(), 2);
        assert_eq!(page_texts(merged.bytes()), vec!["A", "B"]);
    }

    #[test]
    fn test_concat_empty_is_error() {
        assert!(matches!(concat(&[]), Err(Error::EmptyMerge)));
    }

    #[test]
    fn test_concat_single_source() {
        let source = doc(&["Only"]);
        let result = concat(&[&source]).unwrap();
        assert_eq!(result.page_count(), 1);
        assert_eq!(page_texts(result.bytes()), vec!["Only"]);
    }

    #[test]
    fn test_concat_three_sources() {
        let a = doc(&["A1", "A2"]);
        let b = doc(&["B1"]);
        let c = doc(&["C1", "C2"]);

        let result = concat(&[&a, &b, &c]).unwrap();
        assert_eq!(result.page_count(), 5);
        assert_eq!(
            page_texts(result.bytes()),
            vec!["A1", "A2", "B1", "C1", "C2"]
        );
    }

    #[test]
    fn test_merged_output_reparses() {
        let merged = merge(&doc(&["X"]), &doc(&["Y"])).unwrap();
        let reloaded = PdfDocument::from_bytes(merged.serialize().unwrap()).unwrap();
        assert_eq!(reloaded.page_count(), 2);
    }
}
