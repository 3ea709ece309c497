#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use hashbrown::HashMap;
use messaging_service::common::state::{AppState, MessagingLimits};
use messaging_service::entities::messages::Message as MessageEntity;
use messaging_service::entities::presences::Presence;
use messaging_service::models::messages::{Message, NewMessage};
use messaging_service::models::sessions::{SessionHandle, SessionTransport};
use messaging_service::repositories::messages::MessageStore;
use messaging_service::repositories::presences::PresenceMirror;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const KNOWN_USERS: [i64; 3] = [1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Accept,
    Fail,
    Hang,
}

/// Transport that records what the router pushed to it.
pub struct RecordingTransport {
    mode: PushMode,
    pushed: Mutex<Vec<Message>>,
    closed: AtomicBool,
}

impl RecordingTransport {
    pub fn new(mode: PushMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            pushed: Mutex::new(vec![]),
            closed: AtomicBool::new(false),
        })
    }

    pub fn pushed(&self) -> Vec<Message> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionTransport for RecordingTransport {
    async fn push(&self, message: &Message) -> anyhow::Result<()> {
        match self.mode {
            PushMode::Accept => {
                self.pushed.lock().unwrap().push(message.clone());
                Ok(())
            }
            PushMode::Fail => Err(anyhow!("connection reset")),
            PushMode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub fn limits() -> MessagingLimits {
    MessagingLimits {
        message_max_length: 4000,
        push_timeout: Duration::from_millis(100),
        session_buffer_size: 8,
        ping_interval: Duration::from_secs(30),
    }
}

pub fn test_state() -> AppState {
    AppState::in_memory(KNOWN_USERS, limits())
}

pub fn session(user_id: i64, mode: PushMode) -> (SessionHandle, Arc<RecordingTransport>) {
    let transport = RecordingTransport::new(mode);
    (SessionHandle::new(user_id, transport.clone()), transport)
}

/// Store whose writes always fail, as when the database is unreachable.
pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    async fn append(&self, _message: NewMessage) -> anyhow::Result<MessageEntity> {
        Err(anyhow!("connection refused"))
    }

    async fn conversation_between(
        &self,
        _user_a: i64,
        _user_b: i64,
    ) -> anyhow::Result<Vec<MessageEntity>> {
        Ok(vec![])
    }
}

pub fn failing_store_state() -> AppState {
    AppState {
        messages: Arc::new(FailingStore),
        ..test_state()
    }
}

/// Presence mirror with the same write rules as the redis one.
#[derive(Default)]
pub struct MemoryPresences {
    entries: Mutex<HashMap<i64, Presence>>,
}

impl MemoryPresences {
    pub fn entry(&self, user_id: i64) -> Option<Presence> {
        self.entries.lock().unwrap().get(&user_id).cloned()
    }
}

#[async_trait]
impl PresenceMirror for MemoryPresences {
    async fn publish(&self, presence: &Presence) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(current) = entries.get(&presence.user_id) {
            if current.generation >= presence.generation {
                return Ok(false);
            }
        }
        entries.insert(presence.user_id, presence.clone());
        Ok(true)
    }

    async fn retract(&self, user_id: i64, session_id: Uuid) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&user_id) {
            Some(current) if current.session_id == session_id => {
                entries.remove(&user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

pub fn mirrored_state() -> (AppState, Arc<MemoryPresences>) {
    let presences = Arc::new(MemoryPresences::default());
    let state = AppState {
        presences: Some(presences.clone()),
        ..test_state()
    };
    (state, presences)
}
