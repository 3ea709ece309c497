use crate::models::sessions::SessionHandle;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-process map of online users to their single live session.
///
/// Every mutation takes the write lock for one map operation, so `register`
/// and `unregister` are atomic with respect to each other for a given user.
/// Each registration is stamped with a generation taken under that lock, so
/// generations follow the order in which sessions became live.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<i64, SessionHandle>>,
    last_generation: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<i64, SessionHandle>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<i64, SessionHandle>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `handle` the user's live session.
    ///
    /// A previous session is replaced and its transport is asked to close.
    /// The replaced handle is returned for logging.
    pub fn register(&self, handle: SessionHandle) -> Option<SessionHandle> {
        let replaced = {
            let mut sessions = self.write();
            let generation = self.last_generation.fetch_add(1, Ordering::Relaxed) + 1;
            handle.assign_generation(generation);
            sessions.insert(handle.user_id(), handle)
        };
        if let Some(replaced) = &replaced {
            replaced.transport().close();
        }
        replaced
    }

    /// Removes the user's entry only while it still points at `session_id`.
    ///
    /// Returns whether an entry was removed. A disconnect from a session that
    /// has already been replaced is a no-op.
    pub fn unregister(&self, user_id: i64, session_id: Uuid) -> bool {
        let mut sessions = self.write();
        match sessions.get(&user_id) {
            Some(current) if current.session_id() == session_id => {
                sessions.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub fn lookup(&self, user_id: i64) -> Option<SessionHandle> {
        self.read().get(&user_id).cloned()
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.read().contains_key(&user_id)
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Sessions whose last inbound activity is older than `cutoff`.
    pub fn fetch_idle(&self, cutoff: DateTime<Utc>) -> Vec<SessionHandle> {
        self.read()
            .values()
            .filter(|handle| handle.is_idle_since(cutoff))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::messages::Message;
    use crate::models::sessions::SessionTransport;
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingTransport {
        closed: AtomicUsize,
    }

    #[async_trait]
    impl SessionTransport for CountingTransport {
        async fn push(&self, _message: &Message) -> anyhow::Result<()> {
            Ok(())
        }

        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn handle(user_id: i64) -> (SessionHandle, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport::default());
        (SessionHandle::new(user_id, transport.clone()), transport)
    }

    #[test]
    fn lookup_is_absent_for_offline_user() {
        let registry = ConnectionRegistry::new();
        assert!(registry.lookup(1).is_none());
        assert!(!registry.is_online(1));
    }

    #[test]
    fn latest_register_wins() {
        let registry = ConnectionRegistry::new();
        let (h1, _) = handle(1);
        let (h2, _) = handle(1);
        let (h3, _) = handle(1);
        registry.register(h1);
        registry.register(h2);
        registry.register(h3.clone());
        assert_eq!(registry.lookup(1), Some(h3));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn replaced_session_is_closed() {
        let registry = ConnectionRegistry::new();
        let (h1, t1) = handle(1);
        let (h2, t2) = handle(1);
        assert!(registry.register(h1.clone()).is_none());
        assert_eq!(registry.register(h2), Some(h1));
        assert_eq!(t1.closed.load(Ordering::SeqCst), 1);
        assert_eq!(t2.closed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn generations_follow_registration_order() {
        let registry = ConnectionRegistry::new();
        let (first, _) = handle(1);
        let (second, _) = handle(1);
        let (other_user, _) = handle(2);
        assert_eq!(second.generation(), 0);

        // constructed first, registered last
        registry.register(second.clone());
        registry.register(other_user.clone());
        registry.register(first.clone());

        assert!(second.generation() > 0);
        assert!(other_user.generation() > second.generation());
        assert!(first.generation() > other_user.generation());
        assert_eq!(registry.lookup(1).map(|h| h.generation()), Some(first.generation()));
    }

    #[test]
    fn stale_unregister_keeps_newer_session() {
        let registry = ConnectionRegistry::new();
        let (h1, _) = handle(1);
        let (h2, _) = handle(1);
        registry.register(h1.clone());
        registry.register(h2.clone());
        assert!(!registry.unregister(1, h1.session_id()));
        assert_eq!(registry.lookup(1), Some(h2));
    }

    #[test]
    fn matching_unregister_goes_offline() {
        let registry = ConnectionRegistry::new();
        let (h1, _) = handle(1);
        registry.register(h1.clone());
        assert!(registry.unregister(1, h1.session_id()));
        assert!(registry.lookup(1).is_none());
        assert!(!registry.unregister(1, h1.session_id()));
    }

    #[test]
    fn sessions_are_independent_per_user() {
        let registry = ConnectionRegistry::new();
        let (h1, _) = handle(1);
        let (h2, _) = handle(2);
        registry.register(h1.clone());
        registry.register(h2.clone());
        assert!(registry.unregister(2, h2.session_id()));
        assert_eq!(registry.lookup(1), Some(h1));
    }

    #[test]
    fn idle_sessions_are_reported() {
        let registry = ConnectionRegistry::new();
        let (stale, _) = handle(1);
        let (fresh, _) = handle(2);
        registry.register(stale.clone());
        registry.register(fresh.clone());

        let cutoff = Utc::now() + TimeDelta::seconds(1);
        fresh.touch_at(cutoff + TimeDelta::seconds(1));

        let idle = registry.fetch_idle(cutoff);
        assert_eq!(idle, vec![stale]);
    }
}
