use crate::entities::messages::Message;
use crate::models::messages::{ConversationKey, NewMessage};
use async_trait::async_trait;
use chrono::Utc;
use hashbrown::HashMap;
use sqlx::{MySql, Pool};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Durable, append-only message log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists the message, assigning `id` and `created_at` atomically with the insert.
    async fn append(&self, message: NewMessage) -> anyhow::Result<Message>;

    /// Every message between the two users, ascending by `(created_at, id)`.
    async fn conversation_between(&self, user_a: i64, user_b: i64) -> anyhow::Result<Vec<Message>>;
}

const TABLE_NAME: &str = "messages";
const READ_FIELDS: &str = "id, sender_id, receiver_id, content, created_at";

pub struct MySqlMessageStore {
    db: Pool<MySql>,
}

impl MySqlMessageStore {
    pub fn new(db: Pool<MySql>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageStore for MySqlMessageStore {
    async fn append(&self, message: NewMessage) -> anyhow::Result<Message> {
        // id comes from AUTO_INCREMENT and created_at from the column default,
        // both assigned by the server inside the insert
        const INSERT: &str = const_str::concat!(
            "INSERT INTO ",
            TABLE_NAME,
            " (sender_id, receiver_id, content) VALUES (?, ?, ?)"
        );
        const QUERY: &str = const_str::concat!(
            "SELECT ",
            READ_FIELDS,
            " FROM ",
            TABLE_NAME,
            " WHERE id = ?"
        );
        let result = sqlx::query(INSERT)
            .bind(message.sender_id())
            .bind(message.receiver_id())
            .bind(message.content())
            .execute(&self.db)
            .await?;
        let message = sqlx::query_as(QUERY)
            .bind(result.last_insert_id())
            .fetch_one(&self.db)
            .await?;
        Ok(message)
    }

    async fn conversation_between(&self, user_a: i64, user_b: i64) -> anyhow::Result<Vec<Message>> {
        const QUERY: &str = const_str::concat!(
            "SELECT ",
            READ_FIELDS,
            " FROM ",
            TABLE_NAME,
            " WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)",
            " ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as(QUERY)
            .bind(user_a)
            .bind(user_b)
            .bind(user_b)
            .bind(user_a)
            .fetch_all(&self.db)
            .await?;
        Ok(messages)
    }
}

type Conversation = Arc<Mutex<Vec<Message>>>;

/// Process-local store used when no database is configured.
///
/// Each conversation has its own lock; the outer map is only locked long
/// enough to find or create a conversation, so unrelated conversations do
/// not contend.
#[derive(Default)]
pub struct InMemoryMessageStore {
    last_id: AtomicU64,
    conversations: RwLock<HashMap<ConversationKey, Conversation>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fetch_conversation(&self, key: ConversationKey) -> Option<Conversation> {
        let conversations = self
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        conversations.get(&key).cloned()
    }

    fn fetch_or_create_conversation(&self, key: ConversationKey) -> Conversation {
        if let Some(conversation) = self.fetch_conversation(key) {
            return conversation;
        }
        let mut conversations = self
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        conversations.entry(key).or_default().clone()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewMessage) -> anyhow::Result<Message> {
        let key = ConversationKey::new(message.sender_id(), message.receiver_id());
        let conversation = self.fetch_or_create_conversation(key);
        let mut messages = conversation.lock().unwrap_or_else(PoisonError::into_inner);

        // Assigned under the conversation lock: within a conversation, ids and
        // timestamps never decrease in append order, so the vec stays sorted
        // by (created_at, id).
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let created_at = match messages.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let message = Message {
            id,
            sender_id: message.sender_id(),
            receiver_id: message.receiver_id(),
            content: message.into_content(),
            created_at,
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn conversation_between(&self, user_a: i64, user_b: i64) -> anyhow::Result<Vec<Message>> {
        let key = ConversationKey::new(user_a, user_b);
        match self.fetch_conversation(key) {
            Some(conversation) => {
                let messages = conversation.lock().unwrap_or_else(PoisonError::into_inner);
                Ok(messages.clone())
            }
            None => Ok(vec![]),
        }
    }
}
