use crate::common::redis_pool::RedisPool;
use crate::entities::presences::Presence;
use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use std::ops::DerefMut;
use std::sync::LazyLock;
use uuid::Uuid;

/// Copy of the connection registry readable by the rest of the application.
#[async_trait]
pub trait PresenceMirror: Send + Sync {
    /// Records the presence unless an entry from a later registration is already stored.
    async fn publish(&self, presence: &Presence) -> anyhow::Result<bool>;

    /// Removes the user's entry only while it still belongs to `session_id`.
    async fn retract(&self, user_id: i64, session_id: Uuid) -> anyhow::Result<bool>;

    /// Drops every entry. Entries left by a previous process are never valid.
    async fn clear(&self) -> anyhow::Result<()>;
}

const KEY: &str = "profilebook:messaging:presences";

static PUBLISH_NEWER: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if current and tonumber(cjson.decode(current)['generation']) >= tonumber(ARGV[2]) then
    return 0
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
return 1
"#,
    )
});

static DELETE_OWNED: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if current and cjson.decode(current)['session_id'] == ARGV[2] then
    return redis.call('HDEL', KEYS[1], ARGV[1])
end
return 0
"#,
    )
});

pub struct RedisPresenceMirror {
    redis: RedisPool,
}

impl RedisPresenceMirror {
    pub fn new(redis: RedisPool) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl PresenceMirror for RedisPresenceMirror {
    async fn publish(&self, presence: &Presence) -> anyhow::Result<bool> {
        let mut conn = self.redis.get().await?;
        let value = serde_json::to_string(presence)?;
        let written: i64 = PUBLISH_NEWER
            .key(KEY)
            .arg(presence.user_id)
            .arg(presence.generation)
            .arg(value)
            .invoke_async(conn.deref_mut())
            .await?;
        Ok(written > 0)
    }

    async fn retract(&self, user_id: i64, session_id: Uuid) -> anyhow::Result<bool> {
        let mut conn = self.redis.get().await?;
        let removed: i64 = DELETE_OWNED
            .key(KEY)
            .arg(user_id)
            .arg(session_id.to_string())
            .invoke_async(conn.deref_mut())
            .await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let mut conn = self.redis.get().await?;
        let _: () = conn.del(KEY).await?;
        Ok(())
    }
}
