use crate::api::RequestContext;
use crate::common::auth::Caller;
use crate::common::error::{AppError, ServiceResponse};
use crate::models::messages::{Message, SendMessageArgs};
use crate::usecases::messages;
use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::{JsonRejection, PathRejection};

pub async fn send(
    ctx: RequestContext,
    caller: Caller,
    args: Result<Json<SendMessageArgs>, JsonRejection>,
) -> ServiceResponse<Message> {
    let Json(args) = args.map_err(|_| AppError::DecodingRequestFailed)?;
    let message = messages::send(&ctx, caller.user_id, args).await?;
    Ok(Json(message))
}

pub async fn conversation_with(
    ctx: RequestContext,
    caller: Caller,
    user_id: Result<Path<i64>, PathRejection>,
) -> ServiceResponse<Vec<Message>> {
    let Path(other_user_id) = user_id.map_err(|_| AppError::DecodingRequestFailed)?;
    let conversation = messages::fetch_conversation_with(&ctx, caller.user_id, other_user_id).await?;
    Ok(Json(conversation))
}
