use soma_core::{EmailAddress, SubscriberStore, SubscriberStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResubscribeError {
    #[error("Subscriber not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Reactivates a previously unsubscribed address. The drip counter is left
/// untouched, so a returning subscriber does not restart the campaign.
pub struct ResubscribeUseCase<'a, S>
where
    S: SubscriberStore + ?Sized,
{
    subscriber_store: &'a S,
}

impl<'a, S> ResubscribeUseCase<'a, S>
where
    S: SubscriberStore + ?Sized,
{
    pub fn new(subscriber_store: &'a S) -> Self {
        Self { subscriber_store }
    }

    #[tracing::instrument(name = "ResubscribeUseCase::execute", skip_all, fields(email = %email))]
    pub async fn execute(&self, email: &EmailAddress) -> Result<(), ResubscribeError> {
        self.subscriber_store
            .resubscribe(email)
            .await
            .map_err(|e| match e {
                SubscriberStoreError::NotFound => ResubscribeError::NotFound,
                other => ResubscribeError::UnexpectedError(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_adapters::InMemorySubscriberStore;

    #[tokio::test]
    async fn resubscribe_restores_the_subscription_and_keeps_the_counter() {
        let store = InMemorySubscriberStore::new();
        let email = EmailAddress::try_from("a@b.com").unwrap();
        store.add_subscriber(email.clone()).await.unwrap();
        store.mark_sent(&email).await.unwrap();
        store.unsubscribe(&email).await.unwrap();

        ResubscribeUseCase::new(&store).execute(&email).await.unwrap();

        let subscriber = store.find(&email).await.unwrap().unwrap();
        assert!(subscriber.subscription_status);
        assert_eq!(subscriber.newsletters_sent, 1);
    }
}
