//! Axum integration for the somaSOMA school service.
//!
//! Thin HTTP glue: handlers parse form input, call the use cases in
//! `soma_application`, and translate outcomes into flash-message redirects
//! (or JSON for the admin read endpoints). Domain rules live below this
//! crate.

pub mod cookies;
pub mod extract;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::Router;
use axum::routing::{delete, get, post};

/// Build the full route tree over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register/parent", post(routes::register::register_parent))
        .route("/register/student", post(routes::register::register_student))
        .route("/register/teacher", post(routes::register::register_teacher))
        .route("/register/admin", post(routes::register::register_admin))
        .route("/login", post(routes::login::login))
        .route("/login/verify", post(routes::verify_login::verify_login))
        .route("/logout", post(routes::logout::logout))
        .route(
            "/password-reset/request",
            post(routes::password_reset::request_reset),
        )
        .route(
            "/password-reset/{token}",
            post(routes::password_reset::reset_password),
        )
        .route("/newsletter/subscribe", post(routes::newsletter::subscribe))
        .route("/newsletter/confirm", post(routes::newsletter::confirm))
        .route(
            "/newsletter/unsubscribe",
            post(routes::newsletter::unsubscribe),
        )
        .route(
            "/newsletter/resubscribe",
            post(routes::newsletter::resubscribe),
        )
        .route(
            "/account/delete-request",
            post(routes::account::request_deletion),
        )
        .route(
            "/attendance",
            get(routes::attendance::list_attendance).post(routes::attendance::record_attendance),
        )
        .route(
            "/admin/accounts/{role}",
            get(routes::admin::accounts::list_accounts),
        )
        .route(
            "/admin/accounts/{id}/activate",
            post(routes::admin::accounts::activate_account),
        )
        .route(
            "/admin/accounts/{id}/deactivate",
            post(routes::admin::accounts::deactivate_account),
        )
        .route(
            "/admin/accounts/{id}/delete",
            post(routes::admin::accounts::delete_account),
        )
        .route(
            "/admin/emails",
            get(routes::admin::drafts::list_drafts).post(routes::admin::drafts::create_draft),
        )
        .route(
            "/admin/emails/{id}",
            get(routes::admin::drafts::get_draft).post(routes::admin::drafts::update_draft),
        )
        .route(
            "/admin/emails/{id}/delete",
            post(routes::admin::drafts::delete_draft),
        )
        .route(
            "/admin/emails/{id}/allow",
            post(routes::admin::drafts::allow_draft),
        )
        .route(
            "/admin/emails/{id}/dispatch",
            post(routes::admin::drafts::dispatch_draft),
        )
        .route(
            "/admin/newsletter/stage/{stage}",
            post(routes::admin::newsletter::advance_stage),
        )
        .route(
            "/admin/newsletter/subscribers/{email}",
            delete(routes::admin::newsletter::delete_subscriber),
        )
        .with_state(state)
}
