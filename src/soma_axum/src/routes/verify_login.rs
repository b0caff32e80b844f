use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use soma_application::tokens;
use soma_application::{VerifyLoginError, VerifyLoginUseCase};

use crate::cookies::{
    PENDING_LOGIN_COOKIE_NAME, flash, removal, session_cookie,
};
use crate::routes::UnexpectedError;
use crate::routes::login::dashboard_path;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyLoginForm {
    pub code: String,
}

/// Second step of a two-factor login: check the submitted code against the
/// verification service and promote the pending-login cookie to a session.
#[tracing::instrument(name = "VerifyLogin", skip_all)]
pub async fn verify_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<VerifyLoginForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Some(claims) = jar
        .get(PENDING_LOGIN_COOKIE_NAME)
        .and_then(|cookie| tokens::verify_session_token(cookie.value(), state.signing_key_bytes()))
    else {
        return Ok((
            flash(jar, "Login attempt expired. Please log in again."),
            Redirect::to("/login"),
        ));
    };

    let use_case = VerifyLoginUseCase::new(
        state.account_store.as_ref(),
        state.verification_client.as_ref(),
    );

    match use_case.execute(claims.sub, &form.code).await {
        Ok(account) => {
            let token = tokens::issue_session_token(
                account.id,
                account.role(),
                state.session_ttl_seconds,
                state.signing_key_bytes(),
            )
            .map_err(|e| UnexpectedError(e.to_string()))?;

            Ok((
                jar.remove(removal(PENDING_LOGIN_COOKIE_NAME))
                    .add(session_cookie(token)),
                Redirect::to(dashboard_path(account.role())),
            ))
        }
        Err(VerifyLoginError::CodeDenied) => Ok((
            flash(jar, "That code was not accepted"),
            Redirect::to("/login/verify"),
        )),
        Err(VerifyLoginError::NotFound) => Ok((
            flash(
                jar.remove(removal(PENDING_LOGIN_COOKIE_NAME)),
                "Login attempt expired. Please log in again.",
            ),
            Redirect::to("/login"),
        )),
        Err(VerifyLoginError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
