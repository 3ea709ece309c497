use crate::common::error::AppError;
use crate::entities::messages::Message as MessageEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical message record.
///
/// REST responses, conversation history and live push events all carry this
/// exact shape, so clients can reconcile the two paths by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        Self {
            id: value.id,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            content: value.content,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageArgs {
    pub receiver_id: i64,
    pub content: String,
}

/// A message that passed validation and may be appended to the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    sender_id: i64,
    receiver_id: i64,
    content: String,
}

impl NewMessage {
    /// `max_length` counts characters, not bytes.
    pub fn new(
        sender_id: i64,
        receiver_id: i64,
        content: String,
        max_length: usize,
    ) -> Result<Self, AppError> {
        if sender_id == receiver_id {
            return Err(AppError::MessagesSelfRecipient);
        }
        if content.trim().is_empty() {
            return Err(AppError::MessagesEmpty);
        }
        if content.chars().count() > max_length {
            return Err(AppError::MessagesTooLong);
        }
        Ok(Self {
            sender_id,
            receiver_id,
            content,
        })
    }

    pub fn sender_id(&self) -> i64 {
        self.sender_id
    }

    pub fn receiver_id(&self) -> i64 {
        self.receiver_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Unordered pair of participants identifying a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    low: i64,
    high: i64,
}

impl ConversationKey {
    pub fn new(user_a: i64, user_b: i64) -> Self {
        Self {
            low: user_a.min(user_b),
            high: user_a.max(user_b),
        }
    }

    pub fn includes(&self, user_id: i64) -> bool {
        self.low == user_id || self.high == user_id
    }

    pub fn participants(&self) -> (i64, i64) {
        (self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_send() {
        let err = NewMessage::new(1, 1, "hi".to_string(), 10).unwrap_err();
        assert_eq!(err, AppError::MessagesSelfRecipient);
    }

    #[test]
    fn rejects_blank_content() {
        let err = NewMessage::new(1, 2, "   \n".to_string(), 10).unwrap_err();
        assert_eq!(err, AppError::MessagesEmpty);
        let err = NewMessage::new(1, 2, String::new(), 10).unwrap_err();
        assert_eq!(err, AppError::MessagesEmpty);
    }

    #[test]
    fn length_bound_counts_characters() {
        assert!(NewMessage::new(1, 2, "ééééé".to_string(), 5).is_ok());
        let err = NewMessage::new(1, 2, "éééééé".to_string(), 5).unwrap_err();
        assert_eq!(err, AppError::MessagesTooLong);
    }

    #[test]
    fn conversation_key_is_unordered() {
        assert_eq!(ConversationKey::new(7, 3), ConversationKey::new(3, 7));
        assert!(ConversationKey::new(7, 3).includes(3));
        assert!(!ConversationKey::new(7, 3).includes(5));
    }

    #[test]
    fn serializes_canonical_shape() {
        let message = Message {
            id: 1,
            sender_id: 1,
            receiver_id: 2,
            content: "hi".to_string(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["senderId"], 1);
        assert_eq!(value["receiverId"], 2);
        assert_eq!(value["content"], "hi");
        assert!(value["createdAt"].is_string());
    }
}
