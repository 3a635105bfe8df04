//! Artifact route - serving published slot PDFs for inline preview.
//!
//! Preview URLs are versioned (`?v=N`) and responses carry a
//! version+fingerprint ETag, so a superseded artifact can never be
//! resurrected from a browser cache.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;

use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::slots::{InputSlot, SlotId};
use crate::state::AppState;

/// Serve a slot's published artifact inline (the preview iframe target).
pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path((session_id, slot)): Path<(String, SlotId)>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    // Metadata inside the lock (fast)
    let (published, version, path, fingerprint) = session
        .with_session(|s| {
            let fingerprint = match slot {
                SlotId::Top | SlotId::Script => s
                    .input_slot(slot)
                    .and_then(InputSlot::document)
                    .map(|doc| doc.fingerprint()[..8].to_string()),
                SlotId::Merged => s
                    .merged
                    .document()
                    .map(|doc| doc.fingerprint()[..8].to_string()),
            };
            (
                s.store.is_published(slot),
                s.store.version(slot),
                s.store.artifact_path(slot),
                fingerprint,
            )
        })
        .await
        .or_not_found("Session not found")?;

    if !published {
        return Err((
            StatusCode::NOT_FOUND,
            format!("No published artifact for {slot} slot"),
        ));
    }

    let etag = format!(
        "\"{session_id}-{slot}-{version}-{}\"",
        fingerprint.unwrap_or_default()
    );

    // Check If-None-Match header for 304 response
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.to_str().ok() == Some(etag.as_str())
    {
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .body(Body::empty())
            .or_internal_error();
    }

    // Load the artifact from disk (async, outside lock)
    let data = tokio::fs::read(&path).await.or_internal_error()?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, "inline")
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, "private, no-cache")
        .body(Body::from(data))
        .or_internal_error()
}
