pub mod account;
pub mod admin;
pub mod attendance;
pub mod login;
pub mod logout;
pub mod newsletter;
pub mod password_reset;
pub mod register;
pub mod verify_login;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Storage or token failure no handler can recover from.
#[derive(Debug, Error)]
#[error("Unexpected error: {0}")]
pub struct UnexpectedError(pub String);

impl IntoResponse for UnexpectedError {
    fn into_response(self) -> Response {
        tracing::error!("{self}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}
