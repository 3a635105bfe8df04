//! Slot state machine for the three document roles.
//!
//! Each session holds two input slots (top, script) and one merged slot.
//! Input slots cycle `Empty -> Loading -> {Loaded, Invalid}` and back to
//! `Empty` on removal; the merged slot cycles
//! `Empty -> Merging -> {Merged, Failed}` and back to `Empty` on
//! "merge again". A slot's preview URL is attached after its artifact has
//! been published, so `Loaded` without a preview means publishing is still
//! in flight.
//!
//! ## Stale completions
//!
//! Loads and merges run outside the session lock, so two rapid selections
//! on the same slot can complete out of order. Every operation starts by
//! taking a ticket (a per-slot monotonic sequence number); a completion is
//! applied only when its ticket still matches the slot's latest. A stale
//! result is dropped on the floor rather than overwriting a newer one.

use pdf_merger_core::PdfDocument;
use serde::Deserialize;

/// The three document roles. Routing is done on this enum, decided at the
/// call site - never inferred from a UI element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    Top,
    Script,
    Merged,
}

impl SlotId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Script => "script",
            Self::Merged => "merged",
        }
    }

    /// Whether this slot is filled by a file upload (as opposed to a merge).
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Top | Self::Script)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "Top Page",
            Self::Script => "Script Page",
            Self::Merged => "Merged",
        }
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket handed out when an operation starts on a slot.
///
/// Completions must present the ticket; only the latest one is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// State of an input slot (top or script).
#[derive(Debug, Default)]
pub enum InputState {
    #[default]
    Empty,
    Loading,
    Loaded {
        document: PdfDocument,
        file_name: String,
        preview: Option<String>,
    },
    Invalid {
        error: String,
    },
}

/// An input slot with its stale-completion guard.
#[derive(Debug, Default)]
pub struct InputSlot {
    state: InputState,
    seq: u64,
}

impl InputSlot {
    /// Begin a new load: supersedes whatever the slot held and invalidates
    /// any in-flight completion. The caller revokes the slot's artifact.
    pub fn begin_load(&mut self) -> Ticket {
        self.seq += 1;
        self.state = InputState::Loading;
        Ticket(self.seq)
    }

    /// Apply a finished load. Returns `false` (and changes nothing) when the
    /// ticket is stale.
    pub fn complete_load(
        &mut self,
        ticket: Ticket,
        result: Result<(PdfDocument, String), String>,
    ) -> bool {
        if ticket.0 != self.seq {
            return false;
        }

        self.state = match result {
            Ok((document, file_name)) => InputState::Loaded {
                document,
                file_name,
                preview: None,
            },
            Err(error) => InputState::Invalid { error },
        };
        true
    }

    /// Attach the published preview URL. Returns `false` when the ticket is
    /// stale or the slot is no longer loaded.
    pub fn set_preview(&mut self, ticket: Ticket, url: String) -> bool {
        if ticket.0 != self.seq {
            return false;
        }
        if let InputState::Loaded { preview, .. } = &mut self.state {
            *preview = Some(url);
            true
        } else {
            false
        }
    }

    /// Reset to a state indistinguishable from a fresh slot (the sequence
    /// number survives so in-flight completions stay stale).
    pub fn clear(&mut self) {
        self.seq += 1;
        self.state = InputState::Empty;
    }

    pub const fn state(&self) -> &InputState {
        &self.state
    }

    pub const fn document(&self) -> Option<&PdfDocument> {
        match &self.state {
            InputState::Loaded { document, .. } => Some(document),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.state {
            InputState::Loaded { file_name, .. } => Some(file_name),
            _ => None,
        }
    }
}

/// State of the merged slot.
#[derive(Debug, Default)]
pub enum MergedState {
    #[default]
    Empty,
    Merging,
    Merged {
        document: PdfDocument,
        preview: Option<String>,
    },
    Failed {
        error: String,
    },
}

/// The merged slot with its stale-completion guard.
#[derive(Debug, Default)]
pub struct MergedSlot {
    state: MergedState,
    seq: u64,
}

impl MergedSlot {
    pub fn begin_merge(&mut self) -> Ticket {
        self.seq += 1;
        self.state = MergedState::Merging;
        Ticket(self.seq)
    }

    pub fn complete_merge(&mut self, ticket: Ticket, result: Result<PdfDocument, String>) -> bool {
        if ticket.0 != self.seq {
            return false;
        }

        self.state = match result {
            Ok(document) => MergedState::Merged {
                document,
                preview: None,
            },
            Err(error) => MergedState::Failed { error },
        };
        true
    }

    pub fn set_preview(&mut self, ticket: Ticket, url: String) -> bool {
        if ticket.0 != self.seq {
            return false;
        }
        if let MergedState::Merged { preview, .. } = &mut self.state {
            *preview = Some(url);
            true
        } else {
            false
        }
    }

    /// "Merge again": drop the merged result, keep nothing.
    pub fn clear(&mut self) {
        self.seq += 1;
        self.state = MergedState::Empty;
    }

    pub const fn state(&self) -> &MergedState {
        &self.state
    }

    pub const fn document(&self) -> Option<&PdfDocument> {
        match &self.state {
            MergedState::Merged { document, .. } => Some(document),
            _ => None,
        }
    }

    pub const fn is_present(&self) -> bool {
        matches!(self.state, MergedState::Merged { .. })
    }
}
