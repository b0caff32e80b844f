use std::sync::Arc;

use secrecy::{ExposeSecret, Secret};
use soma_core::{
    AccountStore, AttendanceStore, DraftStore, EmailClient, SubscriberStore, VerificationClient,
};

/// Shared handler state: the ports behind `Arc<dyn Trait>` plus the token
/// signing key and link/ttl settings.
#[derive(Clone)]
pub struct AppState {
    pub account_store: Arc<dyn AccountStore>,
    pub attendance_store: Arc<dyn AttendanceStore>,
    pub subscriber_store: Arc<dyn SubscriberStore>,
    pub draft_store: Arc<dyn DraftStore>,
    pub email_client: Arc<dyn EmailClient>,
    pub verification_client: Arc<dyn VerificationClient>,
    pub signing_key: Secret<String>,
    pub session_ttl_seconds: i64,
    pub reset_ttl_seconds: i64,
    pub base_url: String,
}

impl AppState {
    pub fn signing_key_bytes(&self) -> &[u8] {
        self.signing_key.expose_secret().as_bytes()
    }
}
