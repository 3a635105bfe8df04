//! Askama templates and their view models.
//!
//! Route handlers never hand session internals to templates directly; they
//! build the owned view models here inside the session lock and render
//! outside it. All state the page shows (which control replaces which) is
//! derived server-side, so plain form posts keep working without JavaScript.

use askama::Template;
use askama_web::WebTemplate;
use pdf_merger_core::util::human_size;

use crate::slots::{InputSlot, InputState, MergedSlot, MergedState, SlotId};
use crate::state::Session;

// =============================================================================
// Full Page Templates
// =============================================================================

/// Landing page: both input slots empty, first upload creates the session.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate;

/// Session page: slot panels, error banner, merge/download controls.
#[derive(Template, WebTemplate)]
#[template(path = "merge.html")]
pub struct MergeTemplate {
    pub session_id: String,
    pub top: SlotPanel,
    pub script: SlotPanel,
    pub merged: MergedPanel,
    /// Session-level message (missing inputs, publish failures)
    pub message: Option<String>,
}

impl MergeTemplate {
    /// Snapshot a session into owned view data. Runs inside the session
    /// lock, so it must stay allocation-light.
    pub fn for_session(session_id: &str, session: &Session) -> Self {
        Self {
            session_id: session_id.to_string(),
            top: SlotPanel::from_slot(SlotId::Top, &session.top),
            script: SlotPanel::from_slot(SlotId::Script, &session.script),
            merged: MergedPanel::from_slot(&session.merged),
            message: session.message.clone(),
        }
    }

    /// Whether the merge control should be offered at all.
    pub const fn can_merge(&self) -> bool {
        self.top.has_document && self.script.has_document
    }
}

// =============================================================================
// View Models
// =============================================================================

/// Rendered state of one input slot.
pub struct SlotPanel {
    pub id: &'static str,
    pub label: &'static str,
    pub loading: bool,
    pub has_document: bool,
    pub file_name: Option<String>,
    pub page_count: Option<usize>,
    pub size: Option<String>,
    pub preview_url: Option<String>,
    pub error: Option<String>,
}

impl SlotPanel {
    fn from_slot(id: SlotId, slot: &InputSlot) -> Self {
        let mut panel = Self {
            id: id.as_str(),
            label: id.label(),
            loading: false,
            has_document: false,
            file_name: None,
            page_count: None,
            size: None,
            preview_url: None,
            error: None,
        };

        match slot.state() {
            InputState::Empty => {}
            InputState::Loading => panel.loading = true,
            InputState::Loaded {
                document,
                file_name,
                preview,
            } => {
                panel.has_document = true;
                panel.file_name = Some(file_name.clone());
                panel.page_count = Some(document.page_count());
                panel.size = Some(human_size(document.bytes().len()));
                panel.preview_url = preview.clone();
            }
            InputState::Invalid { error } => panel.error = Some(error.clone()),
        }

        panel
    }
}

/// Rendered state of the merged slot.
pub struct MergedPanel {
    pub present: bool,
    pub merging: bool,
    pub page_count: Option<usize>,
    pub preview_url: Option<String>,
    pub error: Option<String>,
}

impl MergedPanel {
    fn from_slot(slot: &MergedSlot) -> Self {
        let mut panel = Self {
            present: false,
            merging: false,
            page_count: None,
            preview_url: None,
            error: None,
        };

        match slot.state() {
            MergedState::Empty => {}
            MergedState::Merging => panel.merging = true,
            MergedState::Merged { document, preview } => {
                panel.present = true;
                panel.page_count = Some(document.page_count());
                panel.preview_url = preview.clone();
            }
            MergedState::Failed { error } => panel.error = Some(error.clone()),
        }

        panel
    }
}
