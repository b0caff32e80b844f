//! Login route. Accounts with a verification phone on file get a code sent
//! and are parked behind a short-lived pending-login cookie until the code
//! checks out; everyone else gets a session cookie straight away.

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use secrecy::Secret;
use serde::Deserialize;
use soma_application::tokens;
use soma_application::{LoginError, LoginOutcome, LoginUseCase};
use soma_core::{Password, Role, Username};

use crate::cookies::{flash, pending_login_cookie, session_cookie};
use crate::routes::UnexpectedError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: Secret<String>,
}

pub fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Parent => "/dashboard/parent",
        Role::Student => "/dashboard/student",
        Role::Teacher => "/dashboard/teacher",
        Role::Admin => "/admin",
    }
}

fn invalid_credentials(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        flash(jar, "Invalid username or password"),
        Redirect::to("/login"),
    )
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    // Malformed input gets the same answer as a wrong password.
    let (Ok(username), Ok(password)) = (
        Username::try_from(form.username),
        Password::try_from(form.password),
    ) else {
        return Ok(invalid_credentials(jar));
    };

    let use_case = LoginUseCase::new(
        state.account_store.as_ref(),
        state.verification_client.as_ref(),
    );

    match use_case.execute(&username, &password).await {
        Ok(LoginOutcome::Success(account)) => {
            let token = tokens::issue_session_token(
                account.id,
                account.role(),
                state.session_ttl_seconds,
                state.signing_key_bytes(),
            )
            .map_err(|e| UnexpectedError(e.to_string()))?;

            Ok((
                jar.add(session_cookie(token)),
                Redirect::to(dashboard_path(account.role())),
            ))
        }
        Ok(LoginOutcome::RequiresVerification(account)) => {
            let token = tokens::issue_session_token(
                account.id,
                account.role(),
                state.session_ttl_seconds,
                state.signing_key_bytes(),
            )
            .map_err(|e| UnexpectedError(e.to_string()))?;

            Ok((
                flash(
                    jar.add(pending_login_cookie(token)),
                    "Enter the verification code we just sent you",
                ),
                Redirect::to("/login/verify"),
            ))
        }
        Err(LoginError::InvalidCredentials) => Ok(invalid_credentials(jar)),
        Err(LoginError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
