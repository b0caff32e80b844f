use axum::response::Redirect;
use axum_extra::extract::CookieJar;

use crate::cookies::{SESSION_COOKIE_NAME, removal};

#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(removal(SESSION_COOKIE_NAME)), Redirect::to("/login"))
}
