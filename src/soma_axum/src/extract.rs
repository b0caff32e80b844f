//! Session extractors. Handlers take a [`Session`] (any signed-in account),
//! an [`AdminSession`], or a [`TeacherSession`] and get the role check for
//! free; a missing or stale cookie redirects to the login page.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use soma_application::tokens;
use soma_core::Role;
use uuid::Uuid;

use crate::cookies::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// A verified login session.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub account_id: Uuid,
    pub role: Role,
}

/// A [`Session`] whose account holds the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession(pub Session);

/// A [`Session`] whose account holds the teacher role.
#[derive(Debug, Clone, Copy)]
pub struct TeacherSession(pub Session);

#[derive(Debug)]
pub enum AuthRejection {
    Unauthenticated,
    PermissionDenied,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => Redirect::to("/login").into_response(),
            AuthRejection::PermissionDenied => {
                (StatusCode::FORBIDDEN, "Permission denied").into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|never| match never {})?;

        let claims = jar
            .get(SESSION_COOKIE_NAME)
            .and_then(|cookie| {
                tokens::verify_session_token(cookie.value(), state.signing_key_bytes())
            })
            .ok_or(AuthRejection::Unauthenticated)?;

        Ok(Session {
            account_id: claims.sub,
            role: claims.role,
        })
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != Role::Admin {
            return Err(AuthRejection::PermissionDenied);
        }
        Ok(AdminSession(session))
    }
}

impl FromRequestParts<AppState> for TeacherSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != Role::Teacher {
            return Err(AuthRejection::PermissionDenied);
        }
        Ok(TeacherSession(session))
    }
}
