use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::MutexGuard;
use uuid::Uuid;

use super::models::{Session, SessionSummary};

/// A live session plus the locks that guard it.
///
/// `turn` serializes everything that must not interleave with a chat
/// turn (another turn, a clear). It is held across the remote call.
/// `session` guards the data itself and is only ever held briefly so
/// lookups and listings never wait on the remote model.
pub struct SessionHandle {
    id: String,
    turn: tokio::sync::Mutex<()>,
    session: Mutex<Session>,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            id: session.id().to_string(),
            turn: tokio::sync::Mutex::new(()),
            session: Mutex::new(session),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    pub fn snapshot(&self) -> Session {
        self.with(|s| s.clone())
    }

    pub fn summary(&self) -> SessionSummary {
        self.with(|s| s.summary())
    }
}

/// Process wide mapping of session ID to session. Sessions live
/// until they are deleted.
pub struct SessionRegistry {
    system_message: String,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new(system_message: &str) -> Self {
        Self {
            system_message: system_message.to_string(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<SessionHandle>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<SessionHandle>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session for `id`, creating it if it doesn't exist.
    /// A missing or blank ID gets a freshly generated one.
    pub fn get_or_create(&self, id: Option<&str>) -> Arc<SessionHandle> {
        let id = id.filter(|id| !id.trim().is_empty());

        if let Some(handle) = id.and_then(|id| self.get(id)) {
            return handle;
        }

        let id = id
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Another request may have created it between the read and
        // the write lock
        let mut sessions = self.write();
        let handle = sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!("Creating chat session {}", id);
            Arc::new(SessionHandle::new(Session::new(&id, &self.system_message)))
        });
        Arc::clone(handle)
    }

    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.read().get(id).cloned()
    }

    /// Reset a session back to its anchor message. Waits for any chat
    /// turn in progress on the session.
    pub async fn clear(&self, id: &str) -> bool {
        let Some(handle) = self.get(id) else {
            return false;
        };
        let _turn = handle.begin_turn().await;
        handle.with(Session::clear);
        true
    }

    pub fn delete(&self, id: &str) -> bool {
        self.write().remove(id).is_some()
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        let handles: Vec<Arc<SessionHandle>> = self.read().values().cloned().collect();
        handles.iter().map(|h| h.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sum of user turns across all sessions.
    pub fn total_user_messages(&self) -> usize {
        self.list().iter().map(|s| s.message_count).sum()
    }
}
