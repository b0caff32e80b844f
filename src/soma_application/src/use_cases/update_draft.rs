use uuid::Uuid;

use soma_core::{DraftStore, DraftStoreError, DraftUpdate, EmailDraft};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateDraftError {
    #[error("Draft not found")]
    NotFound,
    #[error("Draft has already been dispatched")]
    AlreadyDispatched,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Replaces a draft's content. Dispatched drafts are immutable.
pub struct UpdateDraftUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    draft_store: &'a D,
}

impl<'a, D> UpdateDraftUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    pub fn new(draft_store: &'a D) -> Self {
        Self { draft_store }
    }

    #[tracing::instrument(name = "UpdateDraftUseCase::execute", skip_all, fields(draft_id = %id))]
    pub async fn execute(
        &self,
        id: Uuid,
        update: DraftUpdate,
    ) -> Result<EmailDraft, UpdateDraftError> {
        self.draft_store
            .update_draft(id, update)
            .await
            .map_err(|e| match e {
                DraftStoreError::NotFound => UpdateDraftError::NotFound,
                DraftStoreError::AlreadyDispatched => UpdateDraftError::AlreadyDispatched,
                other => UpdateDraftError::UnexpectedError(other.to_string()),
            })
    }
}
