use crate::common::env::{FromEnv, list_from_env};
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

pub struct AppSettings {
    pub level: Level,
    pub app_host: IpAddr,
    pub app_port: u16,

    pub database_url: Option<String>,
    pub db_max_connections: usize,
    pub db_wait_timeout: Duration,

    pub redis_url: Option<String>,
    pub redis_max_connections: usize,
    pub redis_connection_timeout: Duration,
    pub redis_response_timeout: Duration,
    pub redis_wait_timeout: Duration,

    pub message_max_length: usize,
    pub push_timeout: Duration,
    pub session_buffer_size: usize,
    pub session_idle_timeout: Duration,
    pub session_ping_interval: Duration,
    pub session_sweep_interval: Duration,

    /// Directory contents when running without a database
    pub memory_user_ids: Vec<i64>,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let level = Level::from_env_or("LOG_LEVEL", Level::INFO)?;
        let app_host = IpAddr::from_env_or("APP_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let app_port = u16::from_env_or("APP_PORT", 8080)?;

        let database_url = env::var("DATABASE_URL").ok();
        let db_max_connections = usize::from_env_or("DB_MAX_CONNECTIONS", 10)?;
        let db_wait_timeout_secs = u64::from_env_or("DB_WAIT_TIMEOUT_SECS", 5)?;
        let db_wait_timeout = Duration::from_secs(db_wait_timeout_secs);

        let redis_url = env::var("REDIS_URL").ok();
        let redis_max_connections = usize::from_env_or("REDIS_MAX_CONNECTIONS", 10)?;
        let redis_connection_timeout_secs = u64::from_env_or("REDIS_CONNECTION_TIMEOUT_SECS", 5)?;
        let redis_connection_timeout = Duration::from_secs(redis_connection_timeout_secs);
        let redis_response_timeout_secs = u64::from_env_or("REDIS_RESPONSE_TIMEOUT_SECS", 5)?;
        let redis_response_timeout = Duration::from_secs(redis_response_timeout_secs);
        let redis_wait_timeout_secs = u64::from_env_or("REDIS_WAIT_TIMEOUT_SECS", 5)?;
        let redis_wait_timeout = Duration::from_secs(redis_wait_timeout_secs);

        let message_max_length = usize::from_env_or("MESSAGE_MAX_LENGTH", 4000)?;
        let push_timeout_millis = u64::from_env_or("PUSH_TIMEOUT_MILLIS", 2000)?;
        let push_timeout = Duration::from_millis(push_timeout_millis);
        let session_buffer_size = usize::from_env_or("SESSION_BUFFER_SIZE", 64)?;
        let session_idle_timeout_secs = u64::from_env_or("SESSION_IDLE_TIMEOUT_SECS", 5 * 60)?;
        let session_idle_timeout = Duration::from_secs(session_idle_timeout_secs);
        let session_ping_interval_secs = u64::from_env_or("SESSION_PING_INTERVAL_SECS", 30)?;
        let session_ping_interval = Duration::from_secs(session_ping_interval_secs);
        let session_sweep_interval_secs = u64::from_env_or("SESSION_SWEEP_INTERVAL_SECS", 60)?;
        let session_sweep_interval = Duration::from_secs(session_sweep_interval_secs);

        let memory_user_ids = list_from_env("MEMORY_USER_IDS")?;

        Ok(AppSettings {
            level,
            app_port,
            app_host,

            database_url,
            db_max_connections,
            db_wait_timeout,

            redis_url,
            redis_max_connections,
            redis_connection_timeout,
            redis_response_timeout,
            redis_wait_timeout,

            message_max_length,
            push_timeout,
            session_buffer_size,
            session_idle_timeout,
            session_ping_interval,
            session_sweep_interval,

            memory_user_ids,
        })
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
