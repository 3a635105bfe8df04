//! Page routes - full HTML page renders.

use axum::extract::{Path, State};
use std::sync::Arc;

use crate::helpers::{OptionExt, RouteResult};
use crate::state::AppState;
use crate::templates::{IndexTemplate, MergeTemplate};

/// Landing page with two empty slot panels.
///
/// No session exists yet - the first upload creates one and redirects to
/// the session page.
pub async fn index() -> IndexTemplate {
    IndexTemplate
}

/// Session page showing the current state of all three slots.
pub async fn merge_page(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<MergeTemplate> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    session
        .with_session(|s| MergeTemplate::for_session(&session_id, s))
        .await
        .or_not_found("Session not found")
}
