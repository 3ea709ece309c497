use deadpool::managed::{Manager, Metrics, Pool, RecycleError, RecycleResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncConnectionConfig, RedisError, RedisResult};

pub struct RedisPoolManager {
    client: redis::Client,
    config: AsyncConnectionConfig,
}

impl RedisPoolManager {
    pub fn new(client: redis::Client, config: AsyncConnectionConfig) -> Self {
        Self { client, config }
    }
}

impl Manager for RedisPoolManager {
    type Type = MultiplexedConnection;
    type Error = RedisError;

    async fn create(&self) -> RedisResult<Self::Type> {
        self.client
            .get_multiplexed_async_connection_with_config(&self.config)
            .await
    }

    // Connections are only used for best-effort presence writes, so a dead
    // one is replaced instead of surfacing the error to a caller.
    async fn recycle(&self, conn: &mut Self::Type, _metrics: &Metrics) -> RecycleResult<Self::Error> {
        let _: () = redis::cmd("PING")
            .query_async(conn)
            .await
            .map_err(RecycleError::Backend)?;
        Ok(())
    }
}

pub type RedisPool = Pool<RedisPoolManager>;
