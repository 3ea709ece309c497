use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    Unauthorized,
    DecodingRequestFailed,

    ConversationsForbidden,

    MessagesEmpty,
    MessagesTooLong,
    MessagesSelfRecipient,
    MessagesUnknownRecipient,
    MessagesStorageUnavailable,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::ConversationsForbidden => "conversations.forbidden",

            AppError::MessagesEmpty => "messages.empty",
            AppError::MessagesTooLong => "messages.too_long",
            AppError::MessagesSelfRecipient => "messages.self_recipient",
            AppError::MessagesUnknownRecipient => "messages.unknown_recipient",
            AppError::MessagesStorageUnavailable => "messages.storage_unavailable",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "You are not authorized to perform this action.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::ConversationsForbidden => {
                "You do not have permission to read this conversation."
            }

            AppError::MessagesEmpty => "Your message was empty. It has not been sent.",
            AppError::MessagesTooLong => "Your message was too long. It has not been sent.",
            AppError::MessagesSelfRecipient => "You cannot send a message to yourself.",
            AppError::MessagesUnknownRecipient => "This user does not exist.",
            AppError::MessagesStorageUnavailable => {
                "Your message could not be stored. Please try again."
            }
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::MessagesEmpty
            | AppError::MessagesTooLong
            | AppError::MessagesSelfRecipient => StatusCode::BAD_REQUEST,

            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            AppError::ConversationsForbidden => StatusCode::FORBIDDEN,

            AppError::MessagesUnknownRecipient => StatusCode::NOT_FOUND,

            AppError::MessagesStorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
