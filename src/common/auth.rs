use crate::common::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::warn;

/// Header carrying the caller's user id, set by the gateway after it
/// authenticated the request. This service never sees credentials.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok());
        match user_id {
            Some(user_id) => Ok(Caller { user_id }),
            None => {
                warn!(
                    path = parts.uri.path(),
                    "Rejected request without a valid {USER_ID_HEADER} header"
                );
                Err(AppError::Unauthorized)
            }
        }
    }
}
