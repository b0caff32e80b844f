use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use soma_application::{
    AdvanceNewsletterStageError, AdvanceNewsletterStageUseCase, DeleteSubscriberError,
    DeleteSubscriberUseCase,
};
use soma_core::{EmailAddress, NewsletterStage};
use thiserror::Error;

use crate::cookies::flash;
use crate::extract::AdminSession;
use crate::routes::UnexpectedError;
use crate::state::AppState;

/// Send the named drip stage to every active subscriber still waiting on
/// one. Which subscribers qualify is the use case's business; the route
/// just reports the tally.
#[tracing::instrument(name = "AdvanceNewsletterStage", skip_all, fields(stage = %stage))]
pub async fn advance_stage(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(stage): Path<String>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Ok(stage) = NewsletterStage::from_str(&stage) else {
        return Ok((
            flash(jar, "Unknown newsletter stage"),
            Redirect::to("/admin/newsletter"),
        ));
    };

    let use_case = AdvanceNewsletterStageUseCase::new(
        state.subscriber_store.as_ref(),
        state.email_client.as_ref(),
    );

    let report = use_case
        .execute(stage)
        .await
        .map_err(|AdvanceNewsletterStageError::UnexpectedError(e)| UnexpectedError(e))?;

    Ok((
        flash(
            jar,
            format!(
                "Stage {} sent to {} of {} subscribers",
                stage.number(),
                report.delivered,
                report.attempted
            ),
        ),
        Redirect::to("/admin/newsletter"),
    ))
}

#[derive(Debug, Error)]
pub enum DeleteSubscriberRouteError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Subscriber not found")]
    NotFound,
    #[error(transparent)]
    Unexpected(#[from] UnexpectedError),
}

impl IntoResponse for DeleteSubscriberRouteError {
    fn into_response(self) -> Response {
        match self {
            DeleteSubscriberRouteError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Invalid email address" })),
            )
                .into_response(),
            DeleteSubscriberRouteError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "Subscriber not found" })),
            )
                .into_response(),
            DeleteSubscriberRouteError::Unexpected(e) => e.into_response(),
        }
    }
}

#[tracing::instrument(name = "DeleteSubscriber", skip_all)]
pub async fn delete_subscriber(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<StatusCode, DeleteSubscriberRouteError> {
    let email = EmailAddress::try_from(email)
        .map_err(|_| DeleteSubscriberRouteError::InvalidEmail)?;

    DeleteSubscriberUseCase::new(state.subscriber_store.as_ref())
        .execute(&email)
        .await
        .map_err(|e| match e {
            DeleteSubscriberError::NotFound => DeleteSubscriberRouteError::NotFound,
            DeleteSubscriberError::UnexpectedError(e) => UnexpectedError(e).into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
