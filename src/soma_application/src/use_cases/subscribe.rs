use soma_core::{EmailAddress, SubscriberStore, VerificationClient};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("Email is already subscribed")]
    AlreadySubscribed,
    #[error("Email previously unsubscribed")]
    PreviouslyUnsubscribed,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// First half of the newsletter challenge-response: send a one-time code to
/// the candidate address. The address is not stored until the code is
/// confirmed; it rides in a signed cookie in the meantime.
pub struct SubscribeUseCase<'a, S, V>
where
    S: SubscriberStore + ?Sized,
    V: VerificationClient + ?Sized,
{
    subscriber_store: &'a S,
    verification_client: &'a V,
}

impl<'a, S, V> SubscribeUseCase<'a, S, V>
where
    S: SubscriberStore + ?Sized,
    V: VerificationClient + ?Sized,
{
    pub fn new(subscriber_store: &'a S, verification_client: &'a V) -> Self {
        Self {
            subscriber_store,
            verification_client,
        }
    }

    #[tracing::instrument(name = "SubscribeUseCase::execute", skip_all, fields(email = %email))]
    pub async fn execute(&self, email: &EmailAddress) -> Result<(), SubscribeError> {
        match self.subscriber_store.find(email).await {
            Ok(Some(subscriber)) if subscriber.is_active() => {
                return Err(SubscribeError::AlreadySubscribed);
            }
            Ok(Some(_)) => return Err(SubscribeError::PreviouslyUnsubscribed),
            Ok(None) => {}
            Err(e) => return Err(SubscribeError::UnexpectedError(e.to_string())),
        }

        self.verification_client
            .request_code(email.as_str())
            .await
            .map_err(SubscribeError::UnexpectedError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_adapters::{InMemorySubscriberStore, MockVerificationClient};

    #[tokio::test]
    async fn new_address_gets_a_verification_code() {
        let store = InMemorySubscriberStore::new();
        let verification = MockVerificationClient::accepting("123456");
        let email = EmailAddress::try_from("a@b.com").unwrap();

        SubscribeUseCase::new(&store, &verification)
            .execute(&email)
            .await
            .unwrap();

        assert_eq!(
            verification.requested_destinations().await,
            vec!["a@b.com".to_owned()]
        );
    }

    #[tokio::test]
    async fn active_subscriber_is_not_challenged_again() {
        let store = InMemorySubscriberStore::new();
        let verification = MockVerificationClient::accepting("123456");
        let email = EmailAddress::try_from("a@b.com").unwrap();
        store.add_subscriber(email.clone()).await.unwrap();

        let result = SubscribeUseCase::new(&store, &verification)
            .execute(&email)
            .await;

        assert!(matches!(result, Err(SubscribeError::AlreadySubscribed)));
        assert!(verification.requested_destinations().await.is_empty());
    }

    #[tokio::test]
    async fn unsubscribed_address_is_pointed_at_resubscribe() {
        let store = InMemorySubscriberStore::new();
        let verification = MockVerificationClient::accepting("123456");
        let email = EmailAddress::try_from("a@b.com").unwrap();
        store.add_subscriber(email.clone()).await.unwrap();
        store.unsubscribe(&email).await.unwrap();

        let result = SubscribeUseCase::new(&store, &verification)
            .execute(&email)
            .await;

        assert!(matches!(result, Err(SubscribeError::PreviouslyUnsubscribed)));
    }
}
