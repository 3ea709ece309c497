use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Live session record mirrored to redis for the rest of the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub user_id: i64,
    pub session_id: Uuid,
    /// Registry generation; a lower one never replaces a higher one
    pub generation: u64,
    pub connected_at: DateTime<Utc>,
}
