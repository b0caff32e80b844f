use std::sync::Arc;

use tokio::sync::RwLock;

use soma_core::{VerificationClient, VerificationOutcome};

/// Scripted verification collaborator: approves one configured code and
/// records every destination a code was requested for.
#[derive(Clone)]
pub struct MockVerificationClient {
    accepted_code: String,
    requested: Arc<RwLock<Vec<String>>>,
}

impl MockVerificationClient {
    pub fn accepting(code: &str) -> Self {
        Self {
            accepted_code: code.to_owned(),
            requested: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn requested_destinations(&self) -> Vec<String> {
        self.requested.read().await.clone()
    }
}

#[async_trait::async_trait]
impl VerificationClient for MockVerificationClient {
    async fn request_code(&self, destination: &str) -> Result<(), String> {
        self.requested.write().await.push(destination.to_owned());
        Ok(())
    }

    async fn check_code(&self, _destination: &str, code: &str) -> VerificationOutcome {
        if code == self.accepted_code {
            VerificationOutcome::Approved
        } else {
            VerificationOutcome::Denied
        }
    }
}
