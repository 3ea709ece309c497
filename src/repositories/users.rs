use async_trait::async_trait;
use hashbrown::HashSet;
use sqlx::{MySql, Pool};

/// Read-only view of the application's user table.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn exists(&self, user_id: i64) -> anyhow::Result<bool>;
}

pub struct MySqlUserDirectory {
    db: Pool<MySql>,
}

impl MySqlUserDirectory {
    pub fn new(db: Pool<MySql>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn exists(&self, user_id: i64) -> anyhow::Result<bool> {
        const QUERY: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)";
        let exists: i64 = sqlx::query_scalar(QUERY)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(exists != 0)
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    user_ids: HashSet<i64>,
}

impl InMemoryUserDirectory {
    pub fn new(user_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            user_ids: user_ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn exists(&self, user_id: i64) -> anyhow::Result<bool> {
        Ok(self.user_ids.contains(&user_id))
    }
}
