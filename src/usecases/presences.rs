use crate::common::context::Context;
use crate::entities::presences::Presence;
use crate::models::sessions::SessionHandle;
use tracing::{debug, warn};
use uuid::Uuid;

// Mirror writes are best-effort: a redis failure only means other services
// see stale online state, live delivery is unaffected.

/// Mirrors a registered session.
///
/// The mirror refuses entries older than the one it holds. If the session
/// was replaced or disconnected while the write was in flight, the entry is
/// retracted again so it cannot outlive the session.
pub async fn publish<C: Context>(ctx: &C, session: &SessionHandle) {
    let Some(mirror) = ctx.presences() else {
        return;
    };
    let presence = Presence {
        user_id: session.user_id(),
        session_id: session.session_id(),
        generation: session.generation(),
        connected_at: session.connected_at(),
    };
    match mirror.publish(&presence).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(
                user_id = session.user_id(),
                session_id = session.session_id().to_string(),
                "Newer presence already mirrored"
            );
            return;
        }
        Err(e) => {
            warn!(
                user_id = session.user_id(),
                session_id = session.session_id().to_string(),
                "Failed to publish presence: {e:?}"
            );
            return;
        }
    }

    let still_live = ctx
        .connections()
        .lookup(session.user_id())
        .is_some_and(|current| current.session_id() == session.session_id());
    if !still_live {
        retract(ctx, session.user_id(), session.session_id()).await;
    }
}

pub async fn retract<C: Context>(ctx: &C, user_id: i64, session_id: Uuid) {
    let Some(mirror) = ctx.presences() else {
        return;
    };
    if let Err(e) = mirror.retract(user_id, session_id).await {
        warn!(
            user_id,
            session_id = session_id.to_string(),
            "Failed to retract presence: {e:?}"
        );
    }
}

/// Drops entries left behind by a previous process.
pub async fn reset<C: Context>(ctx: &C) -> anyhow::Result<()> {
    match ctx.presences() {
        Some(mirror) => mirror.clear().await,
        None => Ok(()),
    }
}
