use crate::common::redis_pool::{RedisPool, RedisPoolManager};
use crate::common::state::{AppState, MessagingLimits};
use crate::repositories::connections::ConnectionRegistry;
use crate::repositories::messages::{InMemoryMessageStore, MessageStore, MySqlMessageStore};
use crate::repositories::presences::{PresenceMirror, RedisPresenceMirror};
use crate::repositories::users::{InMemoryUserDirectory, MySqlUserDirectory, UserDirectory};
use crate::settings::AppSettings;
use crate::usecases::presences;
use deadpool::Runtime;
use redis::{AsyncConnectionConfig, Commands};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::{info, warn};

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let messages: Arc<dyn MessageStore>;
    let users: Arc<dyn UserDirectory>;
    match &settings.database_url {
        Some(database_url) => {
            let db = initialize_db(settings, database_url).await?;
            info!("Connected to database");
            messages = Arc::new(MySqlMessageStore::new(db.clone()));
            users = Arc::new(MySqlUserDirectory::new(db));
        }
        None => {
            warn!(
                user_count = settings.memory_user_ids.len(),
                "DATABASE_URL is not set, messages will only be kept in memory"
            );
            messages = Arc::new(InMemoryMessageStore::new());
            users = Arc::new(InMemoryUserDirectory::new(
                settings.memory_user_ids.iter().copied(),
            ));
        }
    }

    let presence_mirror: Option<Arc<dyn PresenceMirror>> = match &settings.redis_url {
        Some(redis_url) => {
            let redis = initialize_redis(settings, redis_url)?;
            info!("Connected to redis");
            Some(Arc::new(RedisPresenceMirror::new(redis)))
        }
        None => {
            info!("REDIS_URL is not set, presence mirroring is disabled");
            None
        }
    };

    let state = AppState {
        messages,
        users,
        connections: Arc::new(ConnectionRegistry::new()),
        presences: presence_mirror,
        limits: MessagingLimits {
            message_max_length: settings.message_max_length,
            push_timeout: settings.push_timeout,
            session_buffer_size: settings.session_buffer_size,
            ping_interval: settings.session_ping_interval,
        },
    };
    // the registry starts empty, so must the mirror
    presences::reset(&state).await?;
    Ok(state)
}

pub fn initialize_db(
    settings: &AppSettings,
    database_url: &str,
) -> impl Future<Output = sqlx::Result<Pool<MySql>>> {
    MySqlPoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(database_url)
}

pub fn initialize_redis(settings: &AppSettings, redis_url: &str) -> anyhow::Result<RedisPool> {
    let redis_client = redis::Client::open(redis_url)?;
    let mut conn = redis_client.get_connection_with_timeout(settings.redis_wait_timeout)?;
    let _: () = conn.ping()?;
    let redis_cfg = AsyncConnectionConfig::new()
        .set_connection_timeout(settings.redis_connection_timeout)
        .set_response_timeout(settings.redis_response_timeout);

    let redis_manager = RedisPoolManager::new(redis_client, redis_cfg);
    let redis = RedisPool::builder(redis_manager)
        .max_size(settings.redis_max_connections)
        .wait_timeout(Some(settings.redis_wait_timeout))
        .runtime(Runtime::Tokio1)
        .build()?;
    Ok(redis)
}
