use std::collections::HashMap;

use anyhow::Result;
use pdf_merger_core::{AppConfig, Error, PdfDocument};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::artifact_store::ArtifactStore;
use crate::slots::{InputSlot, MergedSlot, SlotId};

/// Session data for one merge workspace
pub struct Session {
    pub top: InputSlot,
    pub script: InputSlot,
    pub merged: MergedSlot,
    /// Disk-backed storage for published slot artifacts
    pub store: ArtifactStore,
    /// Session-level user message (missing inputs, publish failures)
    pub message: Option<String>,
    pub created_at: std::time::Instant,
}

impl Session {
    fn new() -> Result<Self> {
        let store = ArtifactStore::new()
            .map_err(|e| anyhow::anyhow!("Failed to create artifact store: {e}"))?;

        Ok(Self {
            top: InputSlot::default(),
            script: InputSlot::default(),
            merged: MergedSlot::default(),
            store,
            message: None,
            created_at: std::time::Instant::now(),
        })
    }

    /// The input slot for an id; `None` for the merged slot, which is not
    /// upload-addressable.
    pub fn input_slot_mut(&mut self, slot: SlotId) -> Option<&mut InputSlot> {
        match slot {
            SlotId::Top => Some(&mut self.top),
            SlotId::Script => Some(&mut self.script),
            SlotId::Merged => None,
        }
    }

    pub const fn input_slot(&self, slot: SlotId) -> Option<&InputSlot> {
        match slot {
            SlotId::Top => Some(&self.top),
            SlotId::Script => Some(&self.script),
            SlotId::Merged => None,
        }
    }

    /// Clone both input handles for a merge, or report which precondition
    /// failed. Cloning is O(1) (shared bytes), so this is safe under the
    /// session lock.
    pub fn merge_inputs(&self) -> Result<(PdfDocument, PdfDocument), Error> {
        match (self.top.document(), self.script.document()) {
            (Some(top), Some(script)) => Ok((top.clone(), script.clone())),
            _ => Err(Error::MissingInputs),
        }
    }
}

/// Global application state
pub struct AppState {
    /// Active sessions indexed by UUID
    sessions: RwLock<HashMap<Uuid, Session>>,
    /// Base configuration
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Create a new empty session.
    ///
    /// Returns the session ID as a string (for URL embedding).
    /// Returns an error if the artifact store cannot be created.
    pub async fn create_session(&self) -> Result<String> {
        let id = Uuid::new_v4();
        let session = Session::new()?;

        self.sessions.write().await.insert(id, session);
        Ok(id.to_string())
    }

    /// Get a session by ID string.
    ///
    /// Returns `None` if the ID is not a valid UUID or session doesn't exist.
    pub async fn get_session(&self, id: &str) -> Option<SessionRef<'_>> {
        let uuid = Uuid::parse_str(id).ok()?;
        let sessions = self.sessions.read().await;
        if sessions.contains_key(&uuid) {
            Some(SessionRef {
                id: uuid,
                state: self,
            })
        } else {
            None
        }
    }

    /// Cleanup sessions idle past the configured TTL
    pub async fn cleanup_old_sessions(&self) {
        let mut sessions = self.sessions.write().await;
        let now = std::time::Instant::now();
        let max_age = std::time::Duration::from_secs(self.config.session_ttl_secs);

        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.created_at) < max_age);

        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!("Swept {} idle sessions", removed);
        }
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// A borrowed reference to a session that provides safe access patterns.
///
/// # Why This Pattern?
///
/// In async Rust, holding a lock guard (like `RwLockReadGuard`) across an
/// `.await` point is problematic - it can cause deadlocks and the guard
/// isn't `Send`. This pattern solves that by:
///
/// 1. Storing only the session ID and a reference to the state
/// 2. Acquiring locks only within synchronous closures
/// 3. Releasing locks before any `.await` points
///
/// # Usage
///
/// ```ignore
/// // Good: Lock is released before any await
/// let (a, b) = session.with_session(|s| (s.field_a.clone(), s.field_b)).await?;
/// do_async_work(a, b).await;
///
/// // Bad (won't compile): Holding lock across await
/// let guard = sessions.read().await;
/// let session = guard.get(&id)?;
/// do_async_work(&session.field).await; // Error: guard not Send
/// ```
pub struct SessionRef<'a> {
    id: Uuid,
    state: &'a AppState,
}

impl SessionRef<'_> {
    /// Access session data immutably within a closure.
    ///
    /// The closure runs synchronously while holding a read lock.
    /// The lock is released before this method returns.
    pub async fn with_session<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Session) -> R,
    {
        let sessions = self.state.sessions.read().await;
        sessions.get(&self.id).map(f)
    }

    /// Access session data mutably within a closure.
    ///
    /// The closure runs synchronously while holding a write lock.
    /// The lock is released before this method returns.
    pub async fn with_session_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.state.sessions.write().await;
        sessions.get_mut(&self.id).map(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_session() {
        let state = AppState::new(AppConfig::default());
        let id = state.create_session().await.unwrap();

        assert!(state.get_session(&id).await.is_some());
        assert!(state.get_session("not-a-uuid").await.is_none());
        assert!(
            state
                .get_session(&Uuid::new_v4().to_string())
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_merge_inputs_precondition() {
        let state = AppState::new(AppConfig::default());
        let id = state.create_session().await.unwrap();
        let session = state.get_session(&id).await.unwrap();

        let result = session.with_session(Session::merge_inputs).await.unwrap();
        assert!(matches!(result, Err(Error::MissingInputs)));
    }

    #[tokio::test]
    async fn test_cleanup_respects_ttl() {
        let state = AppState::new(AppConfig::default());
        let _id = state.create_session().await.unwrap();

        // Fresh session survives the sweep
        state.cleanup_old_sessions().await;
        assert_eq!(state.session_count().await, 1);

        let state = AppState::new(AppConfig {
            session_ttl_secs: 1,
            ..Default::default()
        });
        let _id = state.create_session().await.unwrap();
        let session_uuid = *state.sessions.read().await.keys().next().unwrap();
        state
            .sessions
            .write()
            .await
            .get_mut(&session_uuid)
            .unwrap()
            .created_at = std::time::Instant::now() - std::time::Duration::from_secs(5);

        state.cleanup_old_sessions().await;
        assert_eq!(state.session_count().await, 0);
    }
}
