use crate::models::messages::Message;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use uuid::Uuid;

/// The transport side of a live session.
///
/// Implementations move bytes to the connected client; the messaging core
/// never sees the socket itself.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Delivers one message to the client.
    async fn push(&self, message: &Message) -> anyhow::Result<()>;

    /// Asks the transport to shut down. Must not block and must not fail.
    fn close(&self);
}

/// Opaque reference to a user's live session.
///
/// Clones share the transport and liveness clock. Two handles are equal
/// when they refer to the same session id.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    user_id: i64,
    connected_at: DateTime<Utc>,
    generation: Arc<AtomicU64>,
    last_seen_millis: Arc<AtomicI64>,
    transport: Arc<dyn SessionTransport>,
}

impl SessionHandle {
    pub fn new(user_id: i64, transport: Arc<dyn SessionTransport>) -> Self {
        let connected_at = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            connected_at,
            generation: Arc::new(AtomicU64::new(0)),
            last_seen_millis: Arc::new(AtomicI64::new(connected_at.timestamp_millis())),
            transport,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Registration order of the session, zero until it is registered.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn assign_generation(&self, generation: u64) {
        self.generation.store(generation, Ordering::Release);
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        let millis = self.last_seen_millis.load(Ordering::Relaxed);
        DateTime::from_timestamp_millis(millis).unwrap_or(self.connected_at)
    }

    /// Records inbound activity on the session.
    pub fn touch(&self) {
        self.touch_at(Utc::now());
    }

    pub fn touch_at(&self, at: DateTime<Utc>) {
        self.last_seen_millis
            .fetch_max(at.timestamp_millis(), Ordering::Relaxed);
    }

    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_seen() < cutoff
    }

    pub fn transport(&self) -> &dyn SessionTransport {
        self.transport.as_ref()
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.session_id == other.session_id
    }
}

impl Eq for SessionHandle {}

impl Debug for SessionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("connected_at", &self.connected_at)
            .field("generation", &self.generation())
            .field("last_seen", &self.last_seen())
            .finish()
    }
}
