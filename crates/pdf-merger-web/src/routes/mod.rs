//! HTTP route handlers for the PDF merger web application.
//!
//! All state-changing routes follow POST-Redirect-GET back to the session
//! page; HTMX clients get an `HX-Redirect` header instead of a 303 so both
//! paths land on the same server-rendered view. Binary routes (artifact,
//! download) serve the published PDF artifacts directly.

mod artifact;
mod download;
mod merge;
mod pages;
mod upload;

pub use artifact::get_artifact;
pub use download::download_merged;
pub use merge::{merge_again, merge_documents};
pub use pages::{index, merge_page};
pub use upload::{remove_slot, upload_new, upload_to_session};

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

use crate::helpers::{ResultExt, RouteResult};

/// Redirect to `location` - 303 See Other for plain form posts, an
/// `HX-Redirect` header for HTMX requests (which need a full navigation,
/// not a fragment swap).
pub fn see_other(headers: &HeaderMap, location: &str) -> RouteResult<Response> {
    let is_htmx = headers.get("HX-Request").is_some();

    if is_htmx {
        Response::builder()
            .status(StatusCode::OK)
            .header("HX-Redirect", location)
            .body(Body::empty())
            .or_internal_error()
    } else {
        Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header(header::LOCATION, location)
            .body(Body::empty())
            .or_internal_error()
    }
}
