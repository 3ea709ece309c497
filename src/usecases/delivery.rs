use crate::common::context::Context;
use crate::models::delivery::PushOutcome;
use crate::models::messages::Message;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Pushes a persisted message to the receiver's live session, if any.
///
/// Never retries and never waits longer than the configured push timeout.
/// The message is already durable, so every outcome is final for this call.
pub async fn push<C: Context>(ctx: &C, message: &Message) -> PushOutcome {
    let Some(session) = ctx.connections().lookup(message.receiver_id) else {
        debug!(
            message_id = message.id,
            receiver_id = message.receiver_id,
            "Receiver is not online, message left for history"
        );
        return PushOutcome::NotOnline;
    };

    let push_timeout = ctx.limits().push_timeout;
    match timeout(push_timeout, session.transport().push(message)).await {
        Ok(Ok(())) => PushOutcome::Delivered,
        Ok(Err(e)) => {
            warn!(
                message_id = message.id,
                receiver_id = message.receiver_id,
                session_id = session.session_id().to_string(),
                "Failed to push message: {e:?}"
            );
            PushOutcome::DeliveryFailed
        }
        Err(_) => {
            warn!(
                message_id = message.id,
                receiver_id = message.receiver_id,
                session_id = session.session_id().to_string(),
                timeout_ms = push_timeout.as_millis() as u64,
                "Timed out pushing message"
            );
            PushOutcome::DeliveryFailed
        }
    }
}
