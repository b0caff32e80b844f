use uuid::Uuid;

use soma_core::{DraftStore, DraftStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteDraftError {
    #[error("Draft not found")]
    NotFound,
    #[error("Draft has already been dispatched")]
    AlreadyDispatched,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Removes an undispatched draft. Dispatched drafts are kept as a send
/// record and cannot be deleted.
pub struct DeleteDraftUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    draft_store: &'a D,
}

impl<'a, D> DeleteDraftUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    pub fn new(draft_store: &'a D) -> Self {
        Self { draft_store }
    }

    #[tracing::instrument(name = "DeleteDraftUseCase::execute", skip_all, fields(draft_id = %id))]
    pub async fn execute(&self, id: Uuid) -> Result<(), DeleteDraftError> {
        self.draft_store.delete_draft(id).await.map_err(|e| match e {
            DraftStoreError::NotFound => DeleteDraftError::NotFound,
            DraftStoreError::AlreadyDispatched => DeleteDraftError::AlreadyDispatched,
            other => DeleteDraftError::UnexpectedError(other.to_string()),
        })
    }
}
