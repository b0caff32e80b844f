//! Password reset. The request route answers identically whether or not the
//! address maps to an account, and the confirm route treats unknown and
//! expired tokens the same way.

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use secrecy::Secret;
use serde::Deserialize;
use soma_application::{
    RequestPasswordResetUseCase, ResetPasswordError, ResetPasswordUseCase,
};
use soma_core::{EmailAddress, Password};

use crate::cookies::flash;
use crate::routes::UnexpectedError;
use crate::state::AppState;

const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists for that address, a reset link is on its way";

#[derive(Debug, Deserialize)]
pub struct RequestResetForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: Secret<String>,
    pub confirm_password: Secret<String>,
}

#[tracing::instrument(name = "RequestPasswordReset", skip_all)]
pub async fn request_reset(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RequestResetForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let done = (flash(jar, RESET_REQUESTED_MESSAGE), Redirect::to("/login"));

    // A malformed address cannot match an account, so it gets the same
    // answer as an unknown one.
    let Ok(email) = EmailAddress::try_from(form.email) else {
        return Ok(done);
    };

    RequestPasswordResetUseCase::new(
        state.account_store.as_ref(),
        state.email_client.as_ref(),
        state.signing_key_bytes(),
        state.reset_ttl_seconds,
        &state.base_url,
    )
    .execute(&email)
    .await
    .map_err(|e| UnexpectedError(e.to_string()))?;

    Ok(done)
}

#[tracing::instrument(name = "ResetPassword", skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    use secrecy::ExposeSecret;

    if form.password.expose_secret() != form.confirm_password.expose_secret() {
        return Ok((
            flash(jar, "Passwords do not match"),
            Redirect::to(&format!("/password-reset/{token}")),
        ));
    }

    let password = match Password::try_from(form.password) {
        Ok(password) => password,
        Err(e) => {
            return Ok((
                flash(jar, e.to_string()),
                Redirect::to(&format!("/password-reset/{token}")),
            ));
        }
    };

    let use_case = ResetPasswordUseCase::new(state.account_store.as_ref(), state.signing_key_bytes());

    match use_case.execute(&token, password).await {
        Ok(()) => Ok((
            flash(jar, "Password updated. Please log in."),
            Redirect::to("/login"),
        )),
        Err(ResetPasswordError::TokenExpiredOrInvalid) => Ok((
            flash(jar, "That reset link is expired or invalid"),
            Redirect::to("/login"),
        )),
        Err(ResetPasswordError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
