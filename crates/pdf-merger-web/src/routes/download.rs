//! Download route - the merged document with attachment disposition.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use pdf_merger_core::util::merged_filename;
use std::sync::Arc;

use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::slots::SlotId;
use crate::state::AppState;

/// Download the merged PDF.
///
/// The filename is derived from the two source names; sources removed
/// after merging fall back to their slot names.
pub async fn download_merged(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    // Get paths and filenames inside lock (fast)
    let (available, path, top_name, script_name) = session
        .with_session(|s| {
            (
                s.merged.is_present() && s.store.is_published(SlotId::Merged),
                s.store.artifact_path(SlotId::Merged),
                s.top.file_name().map(str::to_string),
                s.script.file_name().map(str::to_string),
            )
        })
        .await
        .or_not_found("Session not found")?;

    if !available {
        return Err((
            StatusCode::BAD_REQUEST,
            "No merged document yet".to_string(),
        ));
    }

    // Load the artifact outside lock (async)
    let data = tokio::fs::read(&path).await.or_internal_error()?;

    let download_name = merged_filename(
        &state.config.download_prefix,
        top_name.as_deref().unwrap_or("top"),
        script_name.as_deref().unwrap_or("script"),
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{download_name}\""),
        )
        .body(Body::from(data))
        .or_internal_error()
}
