use soma_core::{
    EmailAddress, EmailClient, Subscriber, SubscriberStore, SubscriberStoreError,
    VerificationClient,
};
use thiserror::Error;

use crate::templates;

const THANK_YOU_SUBJECT: &str = "[somaSOMA] Thank You For Subscribing";

#[derive(Debug, Error)]
pub enum ConfirmSubscriptionError {
    #[error("Verification code was not accepted")]
    CodeDenied,
    #[error("Email is already subscribed")]
    AlreadySubscribed,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Second half of the newsletter challenge-response: the address owner
/// proves control of the inbox, the subscriber row is created with its drip
/// counter at zero, and a thank-you note goes out.
pub struct ConfirmSubscriptionUseCase<'a, S, V, E>
where
    S: SubscriberStore + ?Sized,
    V: VerificationClient + ?Sized,
    E: EmailClient + ?Sized,
{
    subscriber_store: &'a S,
    verification_client: &'a V,
    email_client: &'a E,
}

impl<'a, S, V, E> ConfirmSubscriptionUseCase<'a, S, V, E>
where
    S: SubscriberStore + ?Sized,
    V: VerificationClient + ?Sized,
    E: EmailClient + ?Sized,
{
    pub fn new(
        subscriber_store: &'a S,
        verification_client: &'a V,
        email_client: &'a E,
    ) -> Self {
        Self {
            subscriber_store,
            verification_client,
            email_client,
        }
    }

    #[tracing::instrument(name = "ConfirmSubscriptionUseCase::execute", skip_all, fields(email = %email))]
    pub async fn execute(
        &self,
        email: &EmailAddress,
        code: &str,
    ) -> Result<Subscriber, ConfirmSubscriptionError> {
        if !self
            .verification_client
            .check_code(email.as_str(), code)
            .await
            .is_approved()
        {
            return Err(ConfirmSubscriptionError::CodeDenied);
        }

        let subscriber = self
            .subscriber_store
            .add_subscriber(email.clone())
            .await
            .map_err(|e| match e {
                SubscriberStoreError::DuplicateIdentity => {
                    ConfirmSubscriptionError::AlreadySubscribed
                }
                other => ConfirmSubscriptionError::UnexpectedError(other.to_string()),
            })?;

        let (text, html) = templates::render_thank_you()
            .map_err(ConfirmSubscriptionError::UnexpectedError)?;
        if let Err(e) = self
            .email_client
            .send_email(&[email.clone()], THANK_YOU_SUBJECT, &text, &html)
            .await
        {
            tracing::warn!("Failed to send subscription thank-you email: {e}");
        }

        Ok(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_adapters::{InMemorySubscriberStore, MockEmailClient, MockVerificationClient};

    #[tokio::test]
    async fn approved_code_creates_the_subscriber_and_thanks_them() {
        let store = InMemorySubscriberStore::new();
        let verification = MockVerificationClient::accepting("123456");
        let email_client = MockEmailClient::new();
        let email = EmailAddress::try_from("a@b.com").unwrap();

        let subscriber =
            ConfirmSubscriptionUseCase::new(&store, &verification, &email_client)
                .execute(&email, "123456")
                .await
                .unwrap();

        assert_eq!(subscriber.newsletters_sent, 0);
        assert!(subscriber.subscription_status);

        let sent = email_client.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, THANK_YOU_SUBJECT);
    }

    #[tokio::test]
    async fn denied_code_stores_nothing() {
        let store = InMemorySubscriberStore::new();
        let verification = MockVerificationClient::accepting("123456");
        let email_client = MockEmailClient::new();
        let email = EmailAddress::try_from("a@b.com").unwrap();

        let result = ConfirmSubscriptionUseCase::new(&store, &verification, &email_client)
            .execute(&email, "999999")
            .await;

        assert!(matches!(result, Err(ConfirmSubscriptionError::CodeDenied)));
        assert!(store.find(&email).await.unwrap().is_none());
        assert!(email_client.sent_emails().await.is_empty());
    }

    #[tokio::test]
    async fn double_confirmation_reports_already_subscribed() {
        let store = InMemorySubscriberStore::new();
        let verification = MockVerificationClient::accepting("123456");
        let email_client = MockEmailClient::new();
        let email = EmailAddress::try_from("a@b.com").unwrap();

        let use_case = ConfirmSubscriptionUseCase::new(&store, &verification, &email_client);
        use_case.execute(&email, "123456").await.unwrap();
        let result = use_case.execute(&email, "123456").await;

        assert!(matches!(
            result,
            Err(ConfirmSubscriptionError::AlreadySubscribed)
        ));
    }
}
