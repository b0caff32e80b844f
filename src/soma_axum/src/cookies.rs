//! Cookie plumbing: the signed-token session cookies and the one-shot flash
//! message read by the next page render.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE_NAME: &str = "session";
pub const PENDING_LOGIN_COOKIE_NAME: &str = "pending_login";
pub const PENDING_SUBSCRIBER_COOKIE_NAME: &str = "pending_subscriber";
pub const FLASH_COOKIE_NAME: &str = "flash";

fn http_only_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    http_only_cookie(SESSION_COOKIE_NAME, token)
}

pub fn pending_login_cookie(token: String) -> Cookie<'static> {
    http_only_cookie(PENDING_LOGIN_COOKIE_NAME, token)
}

pub fn pending_subscriber_cookie(token: String) -> Cookie<'static> {
    http_only_cookie(PENDING_SUBSCRIBER_COOKIE_NAME, token)
}

pub fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}

/// Queue a flash message for the next response.
pub fn flash(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE_NAME, message.into()))
            .path("/")
            .same_site(SameSite::Lax)
            .build(),
    )
}
