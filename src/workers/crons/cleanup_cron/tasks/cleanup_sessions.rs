use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::usecases::sessions;
use chrono::{TimeDelta, Utc};
use std::time::Duration;
use tracing::info;

/// Drops live sessions that have not sent anything for `idle_timeout`.
pub async fn cleanup_sessions<C: Context>(ctx: &C, idle_timeout: Duration) -> ServiceResult<usize> {
    let cutoff = Utc::now() - TimeDelta::from_std(idle_timeout)?;
    let expired = sessions::expire_idle(ctx, cutoff).await;
    if expired > 0 {
        info!(expired, "Expired idle sessions");
    }
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::state::{AppState, MessagingLimits};
    use crate::models::messages::Message;
    use crate::models::sessions::{SessionHandle, SessionTransport};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FlagTransport {
        closed: AtomicBool,
    }

    #[async_trait]
    impl SessionTransport for FlagTransport {
        async fn push(&self, _message: &Message) -> anyhow::Result<()> {
            Ok(())
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn expires_only_idle_sessions() {
        let state = AppState::in_memory([1, 2], MessagingLimits::default());
        let idle_transport = Arc::new(FlagTransport::default());
        let idle = SessionHandle::new(1, idle_transport.clone());
        let active = SessionHandle::new(2, Arc::new(FlagTransport::default()));
        sessions::connect(&state, idle.clone()).await;
        sessions::connect(&state, active.clone()).await;
        active.touch_at(Utc::now() + TimeDelta::minutes(1));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let expired = cleanup_sessions(&state, Duration::from_millis(2)).await.unwrap();

        assert_eq!(expired, 1);
        assert!(idle_transport.closed.load(Ordering::SeqCst));
        assert!(!sessions::is_online(&state, 1));
        assert!(sessions::is_online(&state, 2));
    }
}
