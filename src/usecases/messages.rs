use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::messages::{ConversationKey, Message, NewMessage, SendMessageArgs};
use crate::usecases::delivery;
use tracing::{error, info};

/// Validates, persists and then pushes a direct message.
///
/// The returned record carries the store-assigned `id` and `created_at`.
/// Only validation, an unknown recipient or a storage failure fail the call;
/// the push is best-effort and its outcome is only logged.
pub async fn send<C: Context>(
    ctx: &C,
    sender_id: i64,
    args: SendMessageArgs,
) -> ServiceResult<Message> {
    let new_message = NewMessage::new(
        sender_id,
        args.receiver_id,
        args.content,
        ctx.limits().message_max_length,
    )?;

    match ctx.users().exists(args.receiver_id).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::MessagesUnknownRecipient),
        Err(e) => return unexpected(e),
    }

    let message = match ctx.messages().append(new_message).await {
        Ok(message) => Message::from(message),
        Err(e) => {
            // not retried here: a retry after an ambiguous failure could store the message twice
            error!(sender_id, receiver_id = args.receiver_id, "Failed to store message: {e:?}");
            return Err(AppError::MessagesStorageUnavailable);
        }
    };

    let outcome = delivery::push(ctx, &message).await;
    info!(
        message_id = message.id,
        sender_id = message.sender_id,
        receiver_id = message.receiver_id,
        push = outcome.as_str(),
        "Message sent"
    );
    Ok(message)
}

/// Reads the conversation between `user_a` and `user_b` on behalf of `caller_id`.
pub async fn fetch_conversation<C: Context>(
    ctx: &C,
    caller_id: i64,
    user_a: i64,
    user_b: i64,
) -> ServiceResult<Vec<Message>> {
    let key = ConversationKey::new(user_a, user_b);
    if !key.includes(caller_id) {
        return Err(AppError::ConversationsForbidden);
    }

    let (low, high) = key.participants();
    match ctx.messages().conversation_between(low, high).await {
        Ok(messages) => Ok(messages.into_iter().map(Message::from).collect()),
        Err(e) => unexpected(e),
    }
}

/// The caller's conversation with `other_user_id`.
pub async fn fetch_conversation_with<C: Context>(
    ctx: &C,
    caller_id: i64,
    other_user_id: i64,
) -> ServiceResult<Vec<Message>> {
    fetch_conversation(ctx, caller_id, caller_id, other_user_id).await
}
