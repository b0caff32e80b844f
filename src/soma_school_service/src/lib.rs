//! Composition root for the school service: wires the Postgres stores and
//! outbound clients from [`Settings`] into the route tree and runs it.

pub mod tracing;

use std::sync::Arc;

use axum::Router;
use secrecy::ExposeSecret;
use soma_adapters::{
    PostgresAccountStore, PostgresAttendanceStore, PostgresDraftStore, PostgresSubscriberStore,
    ReqwestEmailClient, Settings, VerifyApiClient,
};
use soma_axum::AppState;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// The assembled school service. Construct it from an [`AppState`] and
/// either run it standalone or take the router and mount it elsewhere.
pub struct SchoolService {
    router: Router,
}

impl SchoolService {
    pub fn new(state: AppState) -> Self {
        Self {
            router: soma_axum::router(state),
        }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    pub fn into_router(self) -> Router {
        self.with_trace_layer().router
    }

    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let router = self.into_router();

        ::tracing::info!("School service listening on {}", listener.local_addr()?);

        axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
            .serve(router.into_make_service())
            .await
    }
}

/// Connect to Postgres and bring the schema up to date.
pub async fn configure_postgresql(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Build the production [`AppState`] over a connected pool.
pub fn build_state(settings: &Settings, pool: PgPool) -> Result<AppState, String> {
    let sender = settings
        .email_client
        .sender()
        .map_err(|e| format!("email_client.sender: {e}"))?;

    let email_client = ReqwestEmailClient::new(
        settings.email_client.base_url.clone(),
        sender,
        settings.email_client.authorization_token.clone(),
        settings.email_client.timeout(),
    );

    let verification_client = VerifyApiClient::new(
        settings.verification.base_url.clone(),
        settings.verification.account_sid.clone(),
        settings.verification.auth_token.clone(),
        settings.verification.service_sid.clone(),
        settings.verification.timeout(),
    );

    Ok(AppState {
        account_store: Arc::new(PostgresAccountStore::new(pool.clone())),
        attendance_store: Arc::new(PostgresAttendanceStore::new(pool.clone())),
        subscriber_store: Arc::new(PostgresSubscriberStore::new(pool.clone())),
        draft_store: Arc::new(PostgresDraftStore::new(pool)),
        email_client: Arc::new(email_client),
        verification_client: Arc::new(verification_client),
        signing_key: settings.auth.signing_key.clone(),
        session_ttl_seconds: settings.auth.session_ttl_seconds,
        reset_ttl_seconds: settings.auth.reset_ttl_seconds,
        base_url: settings.application.base_url.clone(),
    })
}

/// Convenience wrapper: settings straight to a running pool.
pub async fn connect_from_settings(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    configure_postgresql(settings.postgres.url.expose_secret()).await
}
