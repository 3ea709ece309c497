use crate::common::context::Context;
use crate::models::sessions::SessionHandle;
use crate::usecases::presences;
use chrono::{DateTime, Utc};
use tracing::info;

/// Registers a freshly connected session, replacing (and closing) any
/// previous session of the same user.
pub async fn connect<C: Context>(ctx: &C, session: SessionHandle) {
    let replaced = ctx.connections().register(session.clone());
    match replaced {
        Some(replaced) => info!(
            user_id = session.user_id(),
            session_id = session.session_id().to_string(),
            replaced_session_id = replaced.session_id().to_string(),
            "Session replaced an existing session"
        ),
        None => info!(
            user_id = session.user_id(),
            session_id = session.session_id().to_string(),
            "Session connected"
        ),
    }
    presences::publish(ctx, &session).await;
}

/// Unregisters the session if it is still the user's live one.
///
/// Returns false when a newer session already took its place, in which case
/// nothing is changed.
pub async fn disconnect<C: Context>(ctx: &C, session: &SessionHandle) -> bool {
    let removed = ctx
        .connections()
        .unregister(session.user_id(), session.session_id());
    if removed {
        info!(
            user_id = session.user_id(),
            session_id = session.session_id().to_string(),
            "Session disconnected"
        );
        presences::retract(ctx, session.user_id(), session.session_id()).await;
    }
    removed
}

/// Disconnects and closes every session idle since `cutoff`.
pub async fn expire_idle<C: Context>(ctx: &C, cutoff: DateTime<Utc>) -> usize {
    let mut expired = 0;
    for session in ctx.connections().fetch_idle(cutoff) {
        // activity may have arrived since the snapshot
        if !session.is_idle_since(cutoff) {
            continue;
        }
        if disconnect(ctx, &session).await {
            info!(
                user_id = session.user_id(),
                session_id = session.session_id().to_string(),
                last_seen = session.last_seen().to_rfc3339(),
                "Session timed out"
            );
            session.transport().close();
            expired += 1;
        }
    }
    expired
}

pub fn is_online<C: Context>(ctx: &C, user_id: i64) -> bool {
    ctx.connections().is_online(user_id)
}

pub fn fetch_count<C: Context>(ctx: &C) -> usize {
    ctx.connections().count()
}
