use crate::api::RequestContext;
use crate::common::auth::Caller;
use crate::common::error::{AppError, ServiceResponse};
use crate::models::presences::{OnlineCountResponse, PresenceResponse};
use crate::usecases::sessions;
use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::PathRejection;

pub async fn is_online(
    ctx: RequestContext,
    _caller: Caller,
    user_id: Result<Path<i64>, PathRejection>,
) -> ServiceResponse<PresenceResponse> {
    let Path(user_id) = user_id.map_err(|_| AppError::DecodingRequestFailed)?;
    Ok(Json(PresenceResponse {
        user_id,
        online: sessions::is_online(&ctx, user_id),
    }))
}

pub async fn online_count(ctx: RequestContext, _caller: Caller) -> ServiceResponse<OnlineCountResponse> {
    Ok(Json(OnlineCountResponse {
        count: sessions::fetch_count(&ctx),
    }))
}
