use crate::common::context::Context;
use crate::repositories::connections::ConnectionRegistry;
use crate::repositories::messages::{InMemoryMessageStore, MessageStore};
use crate::repositories::presences::PresenceMirror;
use crate::repositories::users::{InMemoryUserDirectory, UserDirectory};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct MessagingLimits {
    pub message_max_length: usize,
    pub push_timeout: Duration,
    pub session_buffer_size: usize,
    /// How often live sessions are pinged so listen-only clients stay active
    pub ping_interval: Duration,
}

impl Default for MessagingLimits {
    fn default() -> Self {
        Self {
            message_max_length: 4000,
            push_timeout: Duration::from_secs(2),
            session_buffer_size: 64,
            ping_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageStore>,
    pub users: Arc<dyn UserDirectory>,
    pub connections: Arc<ConnectionRegistry>,
    pub presences: Option<Arc<dyn PresenceMirror>>,
    pub limits: MessagingLimits,
}

impl AppState {
    /// State backed entirely by process memory, without a presence mirror.
    pub fn in_memory(user_ids: impl IntoIterator<Item = i64>, limits: MessagingLimits) -> Self {
        Self {
            messages: Arc::new(InMemoryMessageStore::new()),
            users: Arc::new(InMemoryUserDirectory::new(user_ids)),
            connections: Arc::new(ConnectionRegistry::new()),
            presences: None,
            limits,
        }
    }
}

impl Context for AppState {
    fn messages(&self) -> &dyn MessageStore {
        self.messages.as_ref()
    }

    fn users(&self) -> &dyn UserDirectory {
        self.users.as_ref()
    }

    fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    fn limits(&self) -> &MessagingLimits {
        &self.limits
    }

    fn presences(&self) -> Option<&dyn PresenceMirror> {
        self.presences.as_deref()
    }
}
