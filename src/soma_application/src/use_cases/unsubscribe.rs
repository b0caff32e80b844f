use soma_core::{EmailAddress, SubscriberStore, SubscriberStoreError, UnsubscribeOutcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnsubscribeError {
    #[error("Subscriber not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Idempotent opt-out. A second request reports that the address was
/// already unsubscribed instead of failing.
pub struct UnsubscribeUseCase<'a, S>
where
    S: SubscriberStore + ?Sized,
{
    subscriber_store: &'a S,
}

impl<'a, S> UnsubscribeUseCase<'a, S>
where
    S: SubscriberStore + ?Sized,
{
    pub fn new(subscriber_store: &'a S) -> Self {
        Self { subscriber_store }
    }

    #[tracing::instrument(name = "UnsubscribeUseCase::execute", skip_all, fields(email = %email))]
    pub async fn execute(
        &self,
        email: &EmailAddress,
    ) -> Result<UnsubscribeOutcome, UnsubscribeError> {
        self.subscriber_store
            .unsubscribe(email)
            .await
            .map_err(|e| match e {
                SubscriberStoreError::NotFound => UnsubscribeError::NotFound,
                other => UnsubscribeError::UnexpectedError(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_adapters::InMemorySubscriberStore;

    #[tokio::test]
    async fn repeat_unsubscribe_reports_already_unsubscribed() {
        let store = InMemorySubscriberStore::new();
        let email = EmailAddress::try_from("a@b.com").unwrap();
        store.add_subscriber(email.clone()).await.unwrap();

        let use_case = UnsubscribeUseCase::new(&store);
        assert_eq!(
            use_case.execute(&email).await.unwrap(),
            UnsubscribeOutcome::Unsubscribed
        );
        assert_eq!(
            use_case.execute(&email).await.unwrap(),
            UnsubscribeOutcome::AlreadyUnsubscribed
        );
    }

    #[tokio::test]
    async fn unknown_address_is_not_found() {
        let store = InMemorySubscriberStore::new();
        let email = EmailAddress::try_from("ghost@b.com").unwrap();

        let result = UnsubscribeUseCase::new(&store).execute(&email).await;
        assert!(matches!(result, Err(UnsubscribeError::NotFound)));
    }
}
