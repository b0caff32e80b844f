use async_trait::async_trait;

use crate::domain::email::EmailAddress;

/// Outbound messaging collaborator. Fire-and-forget: no delivery
/// confirmation is tracked and a failed send is not retried.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_email(
        &self,
        recipients: &[EmailAddress],
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Approved,
    Denied,
}

impl VerificationOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, VerificationOutcome::Approved)
    }
}

/// Third-party one-time-code verification collaborator (phone or email
/// destinations). Transient transport failures surface as `Denied`; callers
/// never see the underlying error detail.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    async fn request_code(&self, destination: &str) -> Result<(), String>;

    async fn check_code(&self, destination: &str, code: &str) -> VerificationOutcome;
}
