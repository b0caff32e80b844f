//! Admin account management: listing per role, activation toggles, and
//! deletion. Listings come back as JSON for the dashboard tables; actions
//! answer with a flash-message redirect.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use soma_application::{
    DeleteAccountError, DeleteAccountUseCase, SetAccountActiveError, SetAccountActiveUseCase,
};
use soma_core::{Account, Role};
use thiserror::Error;
use uuid::Uuid;

use crate::cookies::flash;
use crate::extract::AdminSession;
use crate::routes::UnexpectedError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ListAccountsError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error(transparent)]
    Unexpected(#[from] UnexpectedError),
}

impl IntoResponse for ListAccountsError {
    fn into_response(self) -> Response {
        match self {
            ListAccountsError::UnknownRole(role) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": format!("Unknown role: {role}") })),
            )
                .into_response(),
            ListAccountsError::Unexpected(e) => e.into_response(),
        }
    }
}

#[tracing::instrument(name = "ListAccounts", skip_all, fields(role = %role))]
pub async fn list_accounts(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<Vec<Account>>, ListAccountsError> {
    let role = Role::from_str(&role).map_err(|_| ListAccountsError::UnknownRole(role))?;

    let accounts = state
        .account_store
        .list_by_role(role)
        .await
        .map_err(|e| UnexpectedError(e.to_string()))?;

    Ok(Json(accounts))
}

async fn set_active(
    state: &AppState,
    jar: CookieJar,
    id: Uuid,
    active: bool,
    done: &'static str,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let use_case = SetAccountActiveUseCase::new(state.account_store.as_ref());

    match use_case.execute(id, active).await {
        Ok(()) => Ok((flash(jar, done), Redirect::to("/admin"))),
        Err(SetAccountActiveError::NotFound) => {
            Ok((flash(jar, "Account not found"), Redirect::to("/admin")))
        }
        Err(SetAccountActiveError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "ActivateAccount", skip_all, fields(account_id = %id))]
pub async fn activate_account(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    set_active(&state, jar, id, true, "Account activated").await
}

#[tracing::instrument(name = "DeactivateAccount", skip_all, fields(account_id = %id))]
pub async fn deactivate_account(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    set_active(&state, jar, id, false, "Account deactivated").await
}

#[tracing::instrument(name = "DeleteAccount", skip_all, fields(account_id = %id))]
pub async fn delete_account(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let use_case = DeleteAccountUseCase::new(state.account_store.as_ref());

    match use_case.execute(id).await {
        Ok(()) => Ok((flash(jar, "Account deleted"), Redirect::to("/admin"))),
        Err(DeleteAccountError::NotFound) => {
            Ok((flash(jar, "Account not found"), Redirect::to("/admin")))
        }
        Err(DeleteAccountError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
