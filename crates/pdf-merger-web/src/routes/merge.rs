//! Merge routes - concatenating the two input documents.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tracing::{error, info};

use super::see_other;
use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::slots::SlotId;
use crate::state::AppState;

/// Merge the top and script documents into the merged slot.
///
/// The precondition (both input slots loaded) is checked here, before the
/// engine is ever invoked; a missing input becomes the session message and
/// no slot changes.
pub async fn merge_documents(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    // Precondition check and transition to Merging under one lock, so two
    // concurrent merge posts cannot both proceed on the same ticket.
    let inputs = session
        .with_session_mut(|s| match s.merge_inputs() {
            Ok((top, script)) => {
                s.message = None;
                s.store.revoke(SlotId::Merged);
                let ticket = s.merged.begin_merge();
                Some((top, script, ticket))
            }
            Err(e) => {
                s.message = Some(e.to_string());
                None
            }
        })
        .await
        .or_not_found("Session not found")?;

    let Some((top, script, ticket)) = inputs else {
        return see_other(&headers, &format!("/merge/{session_id}"));
    };

    // Copy pages and serialize outside the lock
    let result = tokio::task::spawn_blocking(move || {
        let doc = pdf_merger_core::merge(&top, &script)?;
        let artifact = doc.serialize()?;
        Ok::<_, pdf_merger_core::Error>((doc, artifact))
    })
    .await
    .map_err(|e| {
        error!("Merge task panicked: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Merge failed".to_string(),
        )
    })?;

    match result {
        Ok((doc, artifact)) => {
            let page_count = doc.page_count();

            let path = session
                .with_session_mut(|s| {
                    if s.merged.complete_merge(ticket, Ok(doc)) {
                        Some(s.store.artifact_path(SlotId::Merged))
                    } else {
                        None
                    }
                })
                .await
                .flatten();

            if let Some(path) = path {
                tokio::fs::write(&path, &artifact).await.or_internal_error()?;

                session
                    .with_session_mut(|s| {
                        s.store.mark_published(SlotId::Merged);
                        let url = s.store.preview_url(&session_id, SlotId::Merged);
                        s.merged.set_preview(ticket, url);
                    })
                    .await;

                info!("Session {} merged into {} pages", session_id, page_count);
            }
        }
        Err(e) => {
            error!("Merge failed for session {}: {}", session_id, e);
            session
                .with_session_mut(|s| {
                    s.merged.complete_merge(ticket, Err(e.to_string()));
                })
                .await;
        }
    }

    see_other(&headers, &format!("/merge/{session_id}"))
}

/// "Merge Again" - clear only the merged slot; top and script stay loaded
/// and keep their previews, ready for a new merge.
pub async fn merge_again(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    session
        .with_session_mut(|s| {
            s.message = None;
            s.store.revoke(SlotId::Merged);
            s.merged.clear();
        })
        .await
        .or_not_found("Session not found")?;

    info!("Cleared merged slot of session {}", session_id);
    see_other(&headers, &format!("/merge/{session_id}"))
}
