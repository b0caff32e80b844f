use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use soma_core::{EmailAddress, EmailClient};

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub recipients: Vec<EmailAddress>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Records outbound mail instead of sending it. Can be switched into a
/// failing mode to exercise failed-send handling.
#[derive(Default, Clone)]
pub struct MockEmailClient {
    sent: Arc<RwLock<Vec<SentEmail>>>,
    failing: Arc<AtomicBool>,
}

impl MockEmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent_emails(&self) -> Vec<SentEmail> {
        self.sent.read().await.clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_email(
        &self,
        recipients: &[EmailAddress],
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("Simulated send failure".to_string());
        }
        self.sent.write().await.push(SentEmail {
            recipients: recipients.to_vec(),
            subject: subject.to_owned(),
            text_body: text_body.to_owned(),
            html_body: html_body.to_owned(),
        });
        Ok(())
    }
}
