use crate::common::error::AppError;
use crate::models::messages::{Message, SendMessageArgs};
use serde::{Deserialize, Serialize};

/// Frames written to a live session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    /// A message addressed to this session's user
    Message { message: Message },
    /// Acknowledges a send made over this session
    Sent { message: Message },
    Pong,
    Error {
        code: &'static str,
        message: &'static str,
    },
}

impl From<AppError> for ServerFrame {
    fn from(e: AppError) -> Self {
        ServerFrame::Error {
            code: e.code(),
            message: e.message(),
        }
    }
}

/// Frames read from a live session.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    Send(SendMessageArgs),
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    #[test]
    fn push_frame_wraps_canonical_message() {
        let message = Message {
            id: 2,
            sender_id: 1,
            receiver_id: 2,
            content: "hey".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let value = serde_json::to_value(ServerFrame::Message {
            message: message.clone(),
        })
        .unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["message"], serde_json::to_value(&message).unwrap());
    }

    #[test]
    fn error_frame_carries_code() {
        let value = serde_json::to_value(ServerFrame::from(AppError::MessagesTooLong)).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "messages.too_long");
    }

    #[test]
    fn parses_client_frames() {
        let frame: ClientFrame =
            serde_json::from_value(json!({"type": "send", "receiverId": 2, "content": "hi"}))
                .unwrap();
        match frame {
            ClientFrame::Send(args) => {
                assert_eq!(args.receiver_id, 2);
                assert_eq!(args.content, "hi");
            }
            other => panic!("unexpected frame {other:?}"),
        }
        let frame: ClientFrame = serde_json::from_value(json!({"type": "ping"})).unwrap();
        assert!(matches!(frame, ClientFrame::Ping));
    }
}
