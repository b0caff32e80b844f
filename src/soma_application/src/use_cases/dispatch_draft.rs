use chrono::Utc;
use uuid::Uuid;

use soma_core::{
    AccountStore, BulkCategory, DraftStore, DraftStoreError, EmailAddress, EmailClient, Role,
    SubscriberStore,
};
use thiserror::Error;

use crate::templates;

#[derive(Debug, Error)]
pub enum DispatchDraftError {
    #[error("Draft not found")]
    NotFound,
    #[error("Draft is not cleared for sending")]
    NotAllowed,
    #[error("Draft has already been dispatched")]
    AlreadyDispatched,
    #[error("No recipients in the selected category")]
    NoRecipients,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Sends a cleared draft, either to its whole bulk category or to one named
/// recipient. Each draft is dispatched at most once; a failed send leaves
/// the draft undispatched so the admin can retry.
pub struct DispatchDraftUseCase<'a, D, A, S, E>
where
    D: DraftStore + ?Sized,
    A: AccountStore + ?Sized,
    S: SubscriberStore + ?Sized,
    E: EmailClient + ?Sized,
{
    draft_store: &'a D,
    account_store: &'a A,
    subscriber_store: &'a S,
    email_client: &'a E,
}

impl<'a, D, A, S, E> DispatchDraftUseCase<'a, D, A, S, E>
where
    D: DraftStore + ?Sized,
    A: AccountStore + ?Sized,
    S: SubscriberStore + ?Sized,
    E: EmailClient + ?Sized,
{
    pub fn new(
        draft_store: &'a D,
        account_store: &'a A,
        subscriber_store: &'a S,
        email_client: &'a E,
    ) -> Self {
        Self {
            draft_store,
            account_store,
            subscriber_store,
            email_client,
        }
    }

    /// Dispatch to everyone in the draft's bulk category. Returns the
    /// recipient count.
    #[tracing::instrument(name = "DispatchDraftUseCase::execute", skip_all, fields(draft_id = %draft_id))]
    pub async fn execute(&self, draft_id: Uuid) -> Result<usize, DispatchDraftError> {
        let draft = self.load_sendable(draft_id).await?;

        let recipients = self.recipients_for(draft.bulk_category).await?;
        if recipients.is_empty() {
            return Err(DispatchDraftError::NoRecipients);
        }

        let (text, html) =
            templates::render_composed(&draft.body, &draft.closing, &draft.signature)
                .map_err(DispatchDraftError::UnexpectedError)?;
        self.email_client
            .send_email(&recipients, &draft.subject, &text, &html)
            .await
            .map_err(DispatchDraftError::UnexpectedError)?;

        self.mark_dispatched(draft_id).await?;
        Ok(recipients.len())
    }

    /// Dispatch to a single named recipient instead of the bulk category.
    #[tracing::instrument(
        name = "DispatchDraftUseCase::execute_individual",
        skip_all,
        fields(draft_id = %draft_id)
    )]
    pub async fn execute_individual(
        &self,
        draft_id: Uuid,
        recipient: &EmailAddress,
    ) -> Result<(), DispatchDraftError> {
        let draft = self.load_sendable(draft_id).await?;

        let (text, html) =
            templates::render_composed(&draft.body, &draft.closing, &draft.signature)
                .map_err(DispatchDraftError::UnexpectedError)?;
        self.email_client
            .send_email(&[recipient.clone()], &draft.subject, &text, &html)
            .await
            .map_err(DispatchDraftError::UnexpectedError)?;

        self.mark_dispatched(draft_id).await
    }

    async fn load_sendable(
        &self,
        draft_id: Uuid,
    ) -> Result<soma_core::EmailDraft, DispatchDraftError> {
        let draft = self
            .draft_store
            .get_draft(draft_id)
            .await
            .map_err(|e| match e {
                DraftStoreError::NotFound => DispatchDraftError::NotFound,
                other => DispatchDraftError::UnexpectedError(other.to_string()),
            })?;

        if draft.dispatched() {
            return Err(DispatchDraftError::AlreadyDispatched);
        }
        if !draft.allow_send {
            return Err(DispatchDraftError::NotAllowed);
        }
        Ok(draft)
    }

    async fn mark_dispatched(&self, draft_id: Uuid) -> Result<(), DispatchDraftError> {
        self.draft_store
            .mark_dispatched(draft_id, Utc::now())
            .await
            .map_err(|e| match e {
                DraftStoreError::NotFound => DispatchDraftError::NotFound,
                DraftStoreError::AlreadyDispatched => DispatchDraftError::AlreadyDispatched,
                other => DispatchDraftError::UnexpectedError(other.to_string()),
            })
    }

    async fn recipients_for(
        &self,
        category: BulkCategory,
    ) -> Result<Vec<EmailAddress>, DispatchDraftError> {
        match category {
            BulkCategory::Subscribers => {
                let subscribers = self
                    .subscriber_store
                    .active_subscribers()
                    .await
                    .map_err(|e| DispatchDraftError::UnexpectedError(e.to_string()))?;
                Ok(subscribers.into_iter().map(|s| s.email).collect())
            }
            BulkCategory::Parents
            | BulkCategory::Students
            | BulkCategory::Teachers
            | BulkCategory::Admins => {
                let role = match category {
                    BulkCategory::Parents => Role::Parent,
                    BulkCategory::Students => Role::Student,
                    BulkCategory::Teachers => Role::Teacher,
                    _ => Role::Admin,
                };
                let accounts = self
                    .account_store
                    .list_by_role(role)
                    .await
                    .map_err(|e| DispatchDraftError::UnexpectedError(e.to_string()))?;
                Ok(accounts.into_iter().map(|a| a.email).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::parent_registration;
    use soma_adapters::{
        InMemoryAccountStore, InMemoryAttendanceStore, InMemoryDraftStore,
        InMemorySubscriberStore, MockEmailClient,
    };
    use soma_core::NewEmailDraft;

    struct Fixture {
        drafts: InMemoryDraftStore,
        accounts: InMemoryAccountStore,
        subscribers: InMemorySubscriberStore,
        email_client: MockEmailClient,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                drafts: InMemoryDraftStore::new(),
                accounts: InMemoryAccountStore::new(InMemoryAttendanceStore::new()),
                subscribers: InMemorySubscriberStore::new(),
                email_client: MockEmailClient::new(),
            }
        }

        fn use_case(
            &self,
        ) -> DispatchDraftUseCase<
            '_,
            InMemoryDraftStore,
            InMemoryAccountStore,
            InMemorySubscriberStore,
            MockEmailClient,
        > {
            DispatchDraftUseCase::new(
                &self.drafts,
                &self.accounts,
                &self.subscribers,
                &self.email_client,
            )
        }

        async fn draft(&self, category: BulkCategory) -> soma_core::EmailDraft {
            self.drafts
                .add_draft(NewEmailDraft {
                    subject: "Term dates".to_owned(),
                    body: "Classes resume on Monday.".to_owned(),
                    closing: "Kind Regards".to_owned(),
                    signature: "somaSOMA".to_owned(),
                    bulk_category: category,
                    author_id: Uuid::new_v4(),
                })
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn cleared_draft_reaches_every_parent() {
        let fixture = Fixture::new();
        fixture
            .accounts
            .add_account(parent_registration("p1", "p1@example.com"))
            .await
            .unwrap();
        fixture
            .accounts
            .add_account(parent_registration("p2", "p2@example.com"))
            .await
            .unwrap();

        let draft = fixture.draft(BulkCategory::Parents).await;
        fixture.drafts.set_allowed(draft.id, true).await.unwrap();

        let count = fixture.use_case().execute(draft.id).await.unwrap();
        assert_eq!(count, 2);

        let sent = fixture.email_client.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients.len(), 2);
        assert!(sent[0].text_body.contains("Classes resume on Monday."));

        assert!(fixture.drafts.get_draft(draft.id).await.unwrap().dispatched());
    }

    #[tokio::test]
    async fn locked_draft_cannot_be_dispatched() {
        let fixture = Fixture::new();
        let draft = fixture.draft(BulkCategory::Parents).await;

        let result = fixture.use_case().execute(draft.id).await;
        assert!(matches!(result, Err(DispatchDraftError::NotAllowed)));
    }

    #[tokio::test]
    async fn second_dispatch_is_rejected() {
        let fixture = Fixture::new();
        fixture
            .subscribers
            .add_subscriber(EmailAddress::try_from("a@b.com").unwrap())
            .await
            .unwrap();

        let draft = fixture.draft(BulkCategory::Subscribers).await;
        fixture.drafts.set_allowed(draft.id, true).await.unwrap();

        fixture.use_case().execute(draft.id).await.unwrap();
        let result = fixture.use_case().execute(draft.id).await;
        assert!(matches!(result, Err(DispatchDraftError::AlreadyDispatched)));
    }

    #[tokio::test]
    async fn empty_category_leaves_the_draft_sendable() {
        let fixture = Fixture::new();
        let draft = fixture.draft(BulkCategory::Teachers).await;
        fixture.drafts.set_allowed(draft.id, true).await.unwrap();

        let result = fixture.use_case().execute(draft.id).await;
        assert!(matches!(result, Err(DispatchDraftError::NoRecipients)));
        assert!(!fixture.drafts.get_draft(draft.id).await.unwrap().dispatched());
    }

    #[tokio::test]
    async fn failed_send_leaves_the_draft_undispatched() {
        let fixture = Fixture::new();
        fixture.email_client.set_failing(true);
        fixture
            .subscribers
            .add_subscriber(EmailAddress::try_from("a@b.com").unwrap())
            .await
            .unwrap();

        let draft = fixture.draft(BulkCategory::Subscribers).await;
        fixture.drafts.set_allowed(draft.id, true).await.unwrap();

        let result = fixture.use_case().execute(draft.id).await;
        assert!(matches!(result, Err(DispatchDraftError::UnexpectedError(_))));
        assert!(!fixture.drafts.get_draft(draft.id).await.unwrap().dispatched());
    }

    #[tokio::test]
    async fn individual_dispatch_targets_one_address() {
        let fixture = Fixture::new();
        let draft = fixture.draft(BulkCategory::Parents).await;
        fixture.drafts.set_allowed(draft.id, true).await.unwrap();

        let recipient = EmailAddress::try_from("one@example.com").unwrap();
        fixture
            .use_case()
            .execute_individual(draft.id, &recipient)
            .await
            .unwrap();

        let sent = fixture.email_client.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, vec![recipient]);
        assert!(fixture.drafts.get_draft(draft.id).await.unwrap().dispatched());
    }
}
