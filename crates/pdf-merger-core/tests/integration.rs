//! Integration tests for pdf-merger-core
//!
//! These tests verify the end-to-end workflow:
//! - Loading with media-type validation
//! - Merging two documents into a fresh target
//! - Serializing the result and re-parsing it
#![allow(clippy::unwrap_used, clippy::panic)]

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_merger_core::{load, merge, merge_files, Error, PdfDocument, PDF_MEDIA_TYPE};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Build a minimal PDF with one text-bearing page per entry.
fn fixture_pdf(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let mut kids = Vec::with_capacity(page_texts.len());
    for page_text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                Operation::new("ET", vec![]),
            ],
        };

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap(),
        ));

        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(page_tree_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let page_tree = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(i64::try_from(page_texts.len()).unwrap())),
    ]);
    doc.objects.insert(page_tree_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(page_tree_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

/// Extract every page's text, in page order.
fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    pages
        .into_iter()
        .map(|page| doc.extract_text(&[page]).unwrap().trim().to_string())
        .collect()
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_load_valid_pdf() {
    let doc = load(fixture_pdf(&["Hello"]), PDF_MEDIA_TYPE, "hello.pdf").unwrap();
    assert_eq!(doc.page_count(), 1);
    assert!(!doc.fingerprint().is_empty());
}

#[test]
fn test_load_rejects_non_pdf_media_type_naming_the_file() {
    let err = load(b"plain text".to_vec(), "text/plain", "notes.txt").unwrap_err();
    match &err {
        Error::UnsupportedFileType { file_name, .. } => assert_eq!(file_name, "notes.txt"),
        other => panic!("expected UnsupportedFileType, got {other:?}"),
    }
    // The user-facing message names the rejected file
    assert!(err.to_string().contains("notes.txt"));
}

#[test]
fn test_load_rejects_malformed_bytes() {
    let err = load(b"%PDF-garbage".to_vec(), PDF_MEDIA_TYPE, "bad.pdf").unwrap_err();
    assert!(matches!(err, Error::ParseFailure(_)));
}

// =============================================================================
// Merge Workflow Tests
// =============================================================================

/// The canonical scenario: a 3-page top and a 2-page script merge into a
/// 5-page document, top's pages first, and the result serializes to a
/// non-empty artifact.
#[test]
fn test_merge_three_plus_two_pages() {
    let top = load(
        fixture_pdf(&["Top 1", "Top 2", "Top 3"]),
        PDF_MEDIA_TYPE,
        "top.pdf",
    )
    .unwrap();
    let script = load(
        fixture_pdf(&["Script 1", "Script 2"]),
        PDF_MEDIA_TYPE,
        "script.pdf",
    )
    .unwrap();

    let merged = merge(&top, &script).unwrap();
    assert_eq!(merged.page_count(), top.page_count() + script.page_count());
    assert_eq!(
        page_texts(merged.bytes()),
        vec!["Top 1", "Top 2", "Top 3", "Script 1", "Script 2"]
    );

    let artifact = merged.serialize().unwrap();
    assert!(!artifact.is_empty());
}

#[test]
fn test_merged_artifact_reloads_through_loader() {
    let top = PdfDocument::from_bytes(fixture_pdf(&["A"])).unwrap();
    let script = PdfDocument::from_bytes(fixture_pdf(&["B"])).unwrap();

    let artifact = merge(&top, &script).unwrap().serialize().unwrap();

    // The published artifact must itself be a loadable PDF
    let reloaded = load(artifact, PDF_MEDIA_TYPE, "merged.pdf").unwrap();
    assert_eq!(reloaded.page_count(), 2);
    assert_eq!(page_texts(reloaded.bytes()), vec!["A", "B"]);
}

#[test]
fn test_merge_is_repeatable_with_same_inputs() {
    let top = PdfDocument::from_bytes(fixture_pdf(&["T"])).unwrap();
    let script = PdfDocument::from_bytes(fixture_pdf(&["S"])).unwrap();

    // "Merge again" keeps the inputs, so a second merge must behave identically
    let first = merge(&top, &script).unwrap();
    let second = merge(&top, &script).unwrap();
    assert_eq!(first.page_count(), second.page_count());
    assert_eq!(page_texts(first.bytes()), page_texts(second.bytes()));
}

// =============================================================================
// File-based Front-end Tests
// =============================================================================

#[test]
fn test_merge_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let top_path = dir.path().join("top.pdf");
    let script_path = dir.path().join("script.pdf");
    std::fs::write(&top_path, fixture_pdf(&["T1", "T2"])).unwrap();
    std::fs::write(&script_path, fixture_pdf(&["S1"])).unwrap();

    let merged = merge_files(&top_path, &script_path).unwrap();
    assert_eq!(merged.page_count(), 3);
    assert_eq!(page_texts(merged.bytes()), vec!["T1", "T2", "S1"]);
}

#[test]
fn test_merge_files_rejects_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let top_path = dir.path().join("top.txt");
    let script_path = dir.path().join("script.pdf");
    std::fs::write(&top_path, fixture_pdf(&["T1"])).unwrap();
    std::fs::write(&script_path, fixture_pdf(&["S1"])).unwrap();

    let err = merge_files(&top_path, &script_path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileType { .. }));
}
