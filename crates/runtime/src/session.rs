// ============================================================================
// Play Session - Runtime Context
// ============================================================================

use barrier_core::{NativeEnvironment, NativeRegistry};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// What a session is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// A running game; runtime instances and natives may be created
    Game,
    /// An editor preview; nothing is simulated
    EditorPreview,
}

/// A live play session. Owns the runtime instances created for it and
/// drops them when it ends.
pub struct PlaySession {
    /// Unique session ID
    id: u64,
    kind: SessionKind,
    environment: Arc<NativeEnvironment>,
    /// When the session was started
    started_at: Instant,
    live: AtomicBool,
    /// Objects owned by this session
    owned: Mutex<Vec<Arc<dyn Any + Send + Sync>>>,
}

impl PlaySession {
    /// Start a session on the calling thread
    pub fn new(environment: Arc<NativeEnvironment>, kind: SessionKind) -> Self {
        environment.assert_owner_thread();
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Play session {} started ({:?})", id, kind);
        Self {
            id,
            kind,
            environment,
            started_at: Instant::now(),
            live: AtomicBool::new(true),
            owned: Mutex::new(Vec::new()),
        }
    }

    /// Start a game session
    pub fn game(environment: Arc<NativeEnvironment>) -> Self {
        Self::new(environment, SessionKind::Game)
    }

    /// Start an editor preview session
    pub fn editor_preview(environment: Arc<NativeEnvironment>) -> Self {
        Self::new(environment, SessionKind::EditorPreview)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn environment(&self) -> &Arc<NativeEnvironment> {
        &self.environment
    }

    /// Engine registry of this session's environment
    pub fn registry(&self) -> &NativeRegistry {
        self.environment.registry()
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// False once the session has ended or its environment shut down
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire) && self.environment.is_active()
    }

    /// A live game session, the only context runtime instances are made in
    pub fn is_game_world(&self) -> bool {
        self.kind == SessionKind::Game && self.is_live()
    }

    /// Hand ownership of a runtime object to the session
    pub(crate) fn adopt(&self, object: Arc<dyn Any + Send + Sync>) {
        self.owned.lock().push(object);
    }

    /// Number of runtime objects owned by the session
    pub fn owned_count(&self) -> usize {
        self.owned.lock().len()
    }

    /// End the session and drop everything it owns
    pub fn end(&self) {
        if !self.live.swap(false, Ordering::AcqRel) {
            return;
        }
        let owned = std::mem::take(&mut *self.owned.lock());
        tracing::debug!(
            "Play session {} ended after {:?}, dropping {} runtime objects",
            self.id,
            self.duration(),
            owned.len()
        );
        drop(owned);
    }
}

impl Drop for PlaySession {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for PlaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaySession")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("live", &self.is_live())
            .field("owned", &self.owned_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_session_is_game_world() {
        let env = NativeEnvironment::headless();
        let game = PlaySession::game(Arc::clone(&env));
        let preview = PlaySession::editor_preview(env);

        assert!(game.is_game_world());
        assert!(!preview.is_game_world());
        assert_ne!(game.id(), preview.id());
    }

    #[test]
    fn test_end_drops_owned_objects() {
        let env = NativeEnvironment::headless();
        let session = PlaySession::game(env);
        let object: Arc<dyn Any + Send + Sync> = Arc::new(5_u32);
        let weak = Arc::downgrade(&object);

        session.adopt(object);
        assert_eq!(session.owned_count(), 1);
        assert!(weak.upgrade().is_some());

        session.end();
        assert!(!session.is_live());
        assert!(!session.is_game_world());
        assert_eq!(session.owned_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_environment_shutdown_ends_game_world() {
        let env = NativeEnvironment::headless();
        let session = PlaySession::game(Arc::clone(&env));
        env.shutdown();
        assert!(!session.is_game_world());
    }
}
