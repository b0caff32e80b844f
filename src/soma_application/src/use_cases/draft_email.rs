use soma_core::{DraftStore, EmailDraft, NewEmailDraft};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftEmailError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Saves a new outbound draft. Drafts start locked: `allow_send` is false
/// until an admin explicitly clears it.
pub struct DraftEmailUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    draft_store: &'a D,
}

impl<'a, D> DraftEmailUseCase<'a, D>
where
    D: DraftStore + ?Sized,
{
    pub fn new(draft_store: &'a D) -> Self {
        Self { draft_store }
    }

    #[tracing::instrument(name = "DraftEmailUseCase::execute", skip_all)]
    pub async fn execute(&self, draft: NewEmailDraft) -> Result<EmailDraft, DraftEmailError> {
        self.draft_store
            .add_draft(draft)
            .await
            .map_err(|e| DraftEmailError::UnexpectedError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_adapters::InMemoryDraftStore;
    use soma_core::BulkCategory;
    use uuid::Uuid;

    #[tokio::test]
    async fn new_drafts_start_locked_and_undispatched() {
        let store = InMemoryDraftStore::new();
        let draft = DraftEmailUseCase::new(&store)
            .execute(NewEmailDraft {
                subject: "Term dates".to_owned(),
                body: "Classes resume on Monday.".to_owned(),
                closing: "Kind Regards".to_owned(),
                signature: "somaSOMA".to_owned(),
                bulk_category: BulkCategory::Parents,
                author_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        assert!(!draft.allow_send);
        assert!(draft.dispatched_at.is_none());
    }
}
