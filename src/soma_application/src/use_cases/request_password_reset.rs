use soma_core::{AccountStore, EmailAddress, EmailClient};
use thiserror::Error;

use crate::templates;
use crate::tokens;

const RESET_EMAIL_SUBJECT: &str = "[somaSOMA] Reset Your Password";

#[derive(Debug, Error)]
pub enum RequestPasswordResetError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Emails a signed reset link to the given address, when an account holds
/// it. The observable outcome is identical whether or not the account
/// exists; a failed send is logged, not reported.
pub struct RequestPasswordResetUseCase<'a, A, E>
where
    A: AccountStore + ?Sized,
    E: EmailClient + ?Sized,
{
    account_store: &'a A,
    email_client: &'a E,
    signing_key: &'a [u8],
    reset_ttl_seconds: i64,
    base_url: &'a str,
}

impl<'a, A, E> RequestPasswordResetUseCase<'a, A, E>
where
    A: AccountStore + ?Sized,
    E: EmailClient + ?Sized,
{
    pub fn new(
        account_store: &'a A,
        email_client: &'a E,
        signing_key: &'a [u8],
        reset_ttl_seconds: i64,
        base_url: &'a str,
    ) -> Self {
        Self {
            account_store,
            email_client,
            signing_key,
            reset_ttl_seconds,
            base_url,
        }
    }

    #[tracing::instrument(name = "RequestPasswordResetUseCase::execute", skip_all)]
    pub async fn execute(&self, email: &EmailAddress) -> Result<(), RequestPasswordResetError> {
        let account = match self.account_store.find_by_email(email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::debug!("No account holds the requested email");
                return Ok(());
            }
            Err(e) => return Err(RequestPasswordResetError::UnexpectedError(e.to_string())),
        };

        let token = tokens::issue_reset_token(account.id, self.reset_ttl_seconds, self.signing_key)
            .map_err(|e| RequestPasswordResetError::UnexpectedError(e.to_string()))?;
        let reset_url = format!("{}/password-reset/{token}", self.base_url);

        let (text, html) = templates::render_reset_password(&account.first_name, &reset_url)
            .map_err(RequestPasswordResetError::UnexpectedError)?;

        if let Err(e) = self
            .email_client
            .send_email(&[account.email.clone()], RESET_EMAIL_SUBJECT, &text, &html)
            .await
        {
            tracing::warn!("Failed to send password reset email: {e}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{TEST_SIGNING_KEY, parent_registration};
    use soma_adapters::{InMemoryAccountStore, InMemoryAttendanceStore, MockEmailClient};

    fn use_case<'a>(
        store: &'a InMemoryAccountStore,
        email_client: &'a MockEmailClient,
    ) -> RequestPasswordResetUseCase<'a, InMemoryAccountStore, MockEmailClient> {
        RequestPasswordResetUseCase::new(
            store,
            email_client,
            TEST_SIGNING_KEY,
            600,
            "https://somasoma.com",
        )
    }

    #[tokio::test]
    async fn known_email_receives_a_working_reset_link() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let email_client = MockEmailClient::new();
        let account = store
            .add_account(parent_registration("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        use_case(&store, &email_client)
            .execute(&account.email)
            .await
            .unwrap();

        let sent = email_client.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, vec![account.email.clone()]);

        // The link embeds a token that resolves back to the account.
        let token = sent[0]
            .text_body
            .split("/password-reset/")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .expect("reset link in email body");
        assert_eq!(
            tokens::verify_reset_token(token, TEST_SIGNING_KEY),
            Some(account.id)
        );
    }

    #[tokio::test]
    async fn unknown_email_sends_nothing_but_still_succeeds() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let email_client = MockEmailClient::new();

        let email = EmailAddress::try_from("ghost@example.com").unwrap();
        use_case(&store, &email_client).execute(&email).await.unwrap();

        assert!(email_client.sent_emails().await.is_empty());
    }

    #[tokio::test]
    async fn send_failure_does_not_change_the_outcome() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let email_client = MockEmailClient::new();
        email_client.set_failing(true);
        let account = store
            .add_account(parent_registration("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        let result = use_case(&store, &email_client).execute(&account.email).await;
        assert!(result.is_ok());
    }
}
