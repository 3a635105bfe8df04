//! Upload routes - loading a PDF into an input slot.
//!
//! Two entry points share one implementation: `POST /upload` creates the
//! session on first contact (the landing page has no session yet), while
//! `POST /upload/{session_id}` targets an existing one. The slot is an
//! explicit form field parsed into [`SlotId`] - never inferred from which
//! control happened to fire.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use axum_extra::extract::Multipart;
use pdf_merger_core::util::sanitize_filename;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::see_other;
use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::slots::{InputSlot, SlotId};
use crate::state::AppState;

/// One parsed upload: which slot, and the file's name/declared type/bytes.
struct UploadRequest {
    slot: SlotId,
    file_name: String,
    declared_media_type: String,
    data: Vec<u8>,
}

/// First upload - creates the session, then behaves like an in-session
/// upload (POST-Redirect-GET to the new session page).
pub async fn upload_new(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> RouteResult<Response> {
    let session_id = state.create_session().await.map_err(|e| {
        error!("Failed to create session: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    handle_upload(&state, &session_id, &headers, multipart).await
}

/// Upload into a slot of an existing session.
pub async fn upload_to_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> RouteResult<Response> {
    handle_upload(&state, &session_id, &headers, multipart).await
}

async fn handle_upload(
    state: &AppState,
    session_id: &str,
    headers: &HeaderMap,
    multipart: Multipart,
) -> RouteResult<Response> {
    let request = read_upload(multipart).await?;
    let slot = request.slot;

    let session = state
        .get_session(session_id)
        .await
        .or_not_found("Session not found")?;

    // Supersede whatever the slot held: new ticket, artifact revoked,
    // session message cleared.
    let ticket = session
        .with_session_mut(|s| {
            s.message = None;
            s.store.revoke(slot);
            s.input_slot_mut(slot).map(InputSlot::begin_load)
        })
        .await
        .or_not_found("Session not found")?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Cannot upload into the merged slot".to_string(),
            )
        })?;

    // Parse and pre-serialize in a blocking task to avoid stalling the
    // async runtime on large documents.
    let file_name = request.file_name.clone();
    let result = tokio::task::spawn_blocking(move || {
        let doc = pdf_merger_core::load(
            request.data,
            &request.declared_media_type,
            &request.file_name,
        )?;
        let artifact = doc.serialize()?;
        Ok::<_, pdf_merger_core::Error>((doc, artifact))
    })
    .await
    .map_err(|e| {
        error!("PDF loading task panicked: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "PDF loading failed".to_string(),
        )
    })?;

    match result {
        Ok((doc, artifact)) => {
            let page_count = doc.page_count();

            // Record the load under the ticket; a stale completion yields no
            // path and nothing further happens.
            let doc_name = file_name.clone();
            let path = session
                .with_session_mut(|s| {
                    let slot_ref = s.input_slot_mut(slot)?;
                    if slot_ref.complete_load(ticket, Ok((doc, doc_name))) {
                        Some(s.store.artifact_path(slot))
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
                        s.store.mark_published(slot);
                        let url = s.store.preview_url(session_id, slot);
                        if let Some(slot_ref) = s.input_slot_mut(slot) {
                            slot_ref.set_preview(ticket, url);
                        }
                    })
                    .await;

                info!(
                    "Loaded {} into {} slot of session {} ({} pages)",
                    file_name, slot, session_id, page_count
                );
            }
        }
        Err(e) => {
            // Wrong media type or unparseable bytes: the error lands in the
            // slot and is shown next to its file input.
            warn!("Rejected upload {} for {} slot: {}", file_name, slot, e);
            session
                .with_session_mut(|s| {
                    if let Some(slot_ref) = s.input_slot_mut(slot) {
                        slot_ref.complete_load(ticket, Err(e.to_string()));
                    }
                })
                .await;
        }
    }

    see_other(headers, &format!("/merge/{session_id}"))
}

/// Remove a loaded input slot: handle discarded, artifact revoked, slot
/// indistinguishable from a fresh one afterwards.
pub async fn remove_slot(
    State(state): State<Arc<AppState>>,
    Path((session_id, slot)): Path<(String, SlotId)>,
    headers: HeaderMap,
) -> RouteResult<Response> {
    if !slot.is_input() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Only input slots can be removed".to_string(),
        ));
    }

    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    session
        .with_session_mut(|s| {
            s.message = None;
            s.store.revoke(slot);
            if let Some(slot_ref) = s.input_slot_mut(slot) {
                slot_ref.clear();
            }
        })
        .await
        .or_not_found("Session not found")?;

    info!("Removed {} slot of session {}", slot, session_id);
    see_other(&headers, &format!("/merge/{session_id}"))
}

/// Pull the slot id and the file out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> RouteResult<UploadRequest> {
    let mut slot: Option<SlotId> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "slot" => {
                let value = field.text().await.or_bad_request()?;
                slot = match value.as_str() {
                    "top" => Some(SlotId::Top),
                    "script" => Some(SlotId::Script),
                    _ => None,
                };
            }
            "file" => {
                let file_name = sanitize_filename(field.file_name().unwrap_or("document.pdf"));

                // Browsers derive the part's Content-Type from the file
                // extension; when a client omits it, fall back to the same
                // derivation so validation sees a declared type either way.
                let declared_media_type = field.content_type().map_or_else(
                    || {
                        mime_guess::from_path(&file_name)
                            .first_raw()
                            .unwrap_or("application/octet-stream")
                            .to_string()
                    },
                    str::to_string,
                );

                let data = field.bytes().await.or_bad_request()?.to_vec();
                file = Some((file_name, declared_media_type, data));
            }
            _ => {}
        }
    }

    let slot = slot.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Missing or invalid slot field".to_string(),
        )
    })?;
    let (file_name, declared_media_type, data) =
        file.ok_or_else(|| (StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;

    Ok(UploadRequest {
        slot,
        file_name,
        declared_media_type,
        data,
    })
}
