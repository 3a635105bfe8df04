//! Disk-backed storage for published slot artifacts.
//!
//! This is the server-side stand-in for object URLs: each slot's serialized
//! PDF is written to a per-session temp directory and addressed through a
//! versioned URL. Superseding or clearing a slot revokes its artifact, so a
//! replaced document's bytes never outlive the slot that owned them.
//!
//! ## Design: Separating Metadata from I/O
//!
//! Fast metadata operations (version tracking, path generation) are split
//! from slow file I/O:
//!
//! - Metadata ops run inside session locks (fast, won't block other requests)
//! - File I/O runs outside locks with `tokio::fs` (async, won't block runtime)
//!
//! Each session gets its own temp directory that's automatically cleaned up
//! when the ArtifactStore (and thus the Session) is dropped.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;

use crate::slots::SlotId;

/// Per-session artifact storage with version tracking.
///
/// Version numbers feed ETag generation and the `?v=` cache-buster in
/// preview URLs. A slot's version only ever grows - revocation removes the
/// file but keeps the counter, so a later artifact can never collide with a
/// cached ETag of an earlier one.
///
/// # Usage Pattern
///
/// ```ignore
/// // Inside session lock - fast metadata only
/// let path = session.store.artifact_path(slot);
///
/// // Outside session lock - async I/O
/// tokio::fs::write(&path, bytes).await?;
///
/// // Inside session lock again - record the publish
/// let version = session.store.mark_published(slot);
/// ```
pub struct ArtifactStore {
    /// Temp directory - auto-cleaned on drop
    dir: TempDir,
    /// Version counter per slot (for ETag generation)
    versions: HashMap<SlotId, u64>,
    /// Slots whose artifact file currently exists
    published: HashMap<SlotId, bool>,
}

impl ArtifactStore {
    /// Create a new store with a fresh temp directory.
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        debug!("Created artifact store at {}", dir.path().display());
        Ok(Self {
            dir,
            versions: HashMap::new(),
            published: HashMap::new(),
        })
    }

    // =========================================================================
    // Metadata operations (fast, safe inside session locks)
    // =========================================================================

    /// File path for a slot's artifact. Just string concatenation.
    pub fn artifact_path(&self, slot: SlotId) -> PathBuf {
        self.dir.path().join(format!("{slot}.pdf"))
    }

    /// Record that a slot's artifact has been written (bumps the version).
    ///
    /// Call this AFTER successfully writing the file.
    pub fn mark_published(&mut self, slot: SlotId) -> u64 {
        let version = self.versions.entry(slot).or_insert(0);
        *version += 1;
        self.published.insert(slot, true);
        debug!("Published {} artifact, v{}", slot, version);
        *version
    }

    /// Current version for a slot (0 if never published).
    pub fn version(&self, slot: SlotId) -> u64 {
        self.versions.get(&slot).copied().unwrap_or(0)
    }

    pub fn is_published(&self, slot: SlotId) -> bool {
        self.published.get(&slot).copied().unwrap_or(false)
    }

    /// Preview URL for a slot's current artifact.
    pub fn preview_url(&self, session_id: &str, slot: SlotId) -> String {
        format!("/artifact/{session_id}/{slot}?v={}", self.version(slot))
    }

    // =========================================================================
    // Revocation
    // =========================================================================

    /// Revoke a slot's artifact: the file is removed, the version counter
    /// survives. Safe to call on slots that never published.
    ///
    /// File removal is synchronous but cheap (unlink of a temp file); doing
    /// it inside the lock keeps revocation atomic with the slot update that
    /// triggered it.
    pub fn revoke(&mut self, slot: SlotId) {
        if self.published.remove(&slot).unwrap_or(false) {
            let path = self.artifact_path(slot);
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("Failed to remove revoked artifact {}: {}", path.display(), e);
            }
            debug!("Revoked {} artifact", slot);
        }
    }

    // =========================================================================
    // Test helpers - sync I/O for unit tests
    // =========================================================================

    /// Write a slot artifact to disk (sync, for tests).
    #[cfg(test)]
    pub fn publish_sync(&mut self, slot: SlotId, data: &[u8]) -> io::Result<u64> {
        std::fs::write(self.artifact_path(slot), data)?;
        Ok(self.mark_published(slot))
    }

    /// Read a slot artifact back (sync, for tests).
    #[cfg(test)]
    pub fn read_sync(&self, slot: SlotId) -> io::Result<Option<Vec<u8>>> {
        if !self.is_published(slot) {
            return Ok(None);
        }
        Ok(Some(std::fs::read(self.artifact_path(slot))?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_read() {
        let mut store = ArtifactStore::new().unwrap();
        let data = b"top artifact";

        store.publish_sync(SlotId::Top, data).unwrap();
        assert!(store.is_published(SlotId::Top));
        assert!(!store.is_published(SlotId::Script));

        let loaded = store.read_sync(SlotId::Top).unwrap().unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_versions_are_monotonic() {
        let mut store = ArtifactStore::new().unwrap();

        assert_eq!(store.version(SlotId::Merged), 0);
        assert_eq!(store.publish_sync(SlotId::Merged, b"v1").unwrap(), 1);
        assert_eq!(store.publish_sync(SlotId::Merged, b"v2").unwrap(), 2);
    }

    #[test]
    fn test_revoke_removes_file_but_keeps_version() {
        let mut store = ArtifactStore::new().unwrap();
        store.publish_sync(SlotId::Top, b"artifact").unwrap();

        store.revoke(SlotId::Top);
        assert!(!store.is_published(SlotId::Top));
        assert!(store.read_sync(SlotId::Top).unwrap().is_none());
        assert!(!store.artifact_path(SlotId::Top).exists());

        // Version survives revocation, so the next publish moves past it
        assert_eq!(store.version(SlotId::Top), 1);
        assert_eq!(store.publish_sync(SlotId::Top, b"next").unwrap(), 2);
    }

    #[test]
    fn test_revoke_never_published_is_noop() {
        let mut store = ArtifactStore::new().unwrap();
        store.revoke(SlotId::Script);
        assert_eq!(store.version(SlotId::Script), 0);
    }

    #[test]
    fn test_preview_url_embeds_version() {
        let mut store = ArtifactStore::new().unwrap();
        store.publish_sync(SlotId::Merged, b"pdf").unwrap();
        assert_eq!(
            store.preview_url("abc", SlotId::Merged),
            "/artifact/abc/merged?v=1"
        );
    }
}
