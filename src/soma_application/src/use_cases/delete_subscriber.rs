use soma_core::{EmailAddress, SubscriberStore, SubscriberStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteSubscriberError {
    #[error("Subscriber not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Hard removal of a subscriber row, used by the admin ledger view.
pub struct DeleteSubscriberUseCase<'a, S>
where
    S: SubscriberStore + ?Sized,
{
    subscriber_store: &'a S,
}

impl<'a, S> DeleteSubscriberUseCase<'a, S>
where
    S: SubscriberStore + ?Sized,
{
    pub fn new(subscriber_store: &'a S) -> Self {
        Self { subscriber_store }
    }

    #[tracing::instrument(name = "DeleteSubscriberUseCase::execute", skip_all, fields(email = %email))]
    pub async fn execute(&self, email: &EmailAddress) -> Result<(), DeleteSubscriberError> {
        self.subscriber_store
            .delete(email)
            .await
            .map_err(|e| match e {
                SubscriberStoreError::NotFound => DeleteSubscriberError::NotFound,
                other => DeleteSubscriberError::UnexpectedError(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_adapters::InMemorySubscriberStore;

    #[tokio::test]
    async fn deleted_subscriber_can_subscribe_afresh() {
        let store = InMemorySubscriberStore::new();
        let email = EmailAddress::try_from("a@b.com").unwrap();
        store.add_subscriber(email.clone()).await.unwrap();
        store.mark_sent(&email).await.unwrap();

        DeleteSubscriberUseCase::new(&store)
            .execute(&email)
            .await
            .unwrap();

        // A fresh enrollment starts the drip over.
        let subscriber = store.add_subscriber(email).await.unwrap();
        assert_eq!(subscriber.newsletters_sent, 0);
    }
}
