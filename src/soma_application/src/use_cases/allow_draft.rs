use uuid::Uuid;

use soma_core::{DraftStore, DraftStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllowDraftError {
    #[error("Draft not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Clears or re-locks a draft for dispatch. Separate from dispatching so an
/// admin can stage content before committing to a send.
pub struct AllowDraftUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    draft_store: &'a D,
}

impl<'a, D> AllowDraftUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    pub fn new(draft_store: &'a D) -> Self {
        Self { draft_store }
    }

    #[tracing::instrument(name = "AllowDraftUseCase::execute", skip_all, fields(draft_id = %id, allowed))]
    pub async fn execute(&self, id: Uuid, allowed: bool) -> Result<(), AllowDraftError> {
        self.draft_store
            .set_allowed(id, allowed)
            .await
            .map_err(|e| match e {
                DraftStoreError::NotFound => AllowDraftError::NotFound,
                other => AllowDraftError::UnexpectedError(other.to_string()),
            })
    }
}
