use uuid::Uuid;

use soma_core::{Account, AccountStore, AccountStoreError, VerificationClient};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyLoginError {
    #[error("Verification code was not accepted")]
    CodeDenied,
    #[error("Account not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Second step of a two-factor login: check the one-time code delivered to
/// the account's verification phone.
pub struct VerifyLoginUseCase<'a, A, V>
where
    A: AccountStore + ?Sized,
    V: VerificationClient + ?Sized,
{
    account_store: &'a A,
    verification_client: &'a V,
}

impl<'a, A, V> VerifyLoginUseCase<'a, A, V>
where
    A: AccountStore + ?Sized,
    V: VerificationClient + ?Sized,
{
    pub fn new(account_store: &'a A, verification_client: &'a V) -> Self {
        Self {
            account_store,
            verification_client,
        }
    }

    #[tracing::instrument(name = "VerifyLoginUseCase::execute", skip_all, fields(account_id = %account_id))]
    pub async fn execute(&self, account_id: Uuid, code: &str) -> Result<Account, VerifyLoginError> {
        let account = self
            .account_store
            .get_account(account_id)
            .await
            .map_err(|e| match e {
                AccountStoreError::NotFound => VerifyLoginError::NotFound,
                other => VerifyLoginError::UnexpectedError(other.to_string()),
            })?;

        let Some(verification_phone) = &account.verification_phone else {
            return Err(VerifyLoginError::CodeDenied);
        };

        if self
            .verification_client
            .check_code(verification_phone.as_str(), code)
            .await
            .is_approved()
        {
            Ok(account)
        } else {
            Err(VerifyLoginError::CodeDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::parent_registration;
    use soma_adapters::{InMemoryAccountStore, InMemoryAttendanceStore, MockVerificationClient};
    use soma_core::PhoneNumber;

    async fn two_factor_account(store: &InMemoryAccountStore) -> Account {
        let mut registration = parent_registration("jdoe", "jdoe@example.com");
        registration.verification_phone =
            Some(PhoneNumber::try_from("+254700999888").unwrap());
        store.add_account(registration).await.unwrap()
    }

    #[tokio::test]
    async fn accepted_code_completes_the_login() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let verification = MockVerificationClient::accepting("123456");
        let account = two_factor_account(&store).await;

        let use_case = VerifyLoginUseCase::new(&store, &verification);
        let verified = use_case.execute(account.id, "123456").await.unwrap();
        assert_eq!(verified.id, account.id);
    }

    #[tokio::test]
    async fn wrong_code_is_denied() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let verification = MockVerificationClient::accepting("123456");
        let account = two_factor_account(&store).await;

        let use_case = VerifyLoginUseCase::new(&store, &verification);
        let result = use_case.execute(account.id, "000000").await;
        assert!(matches!(result, Err(VerifyLoginError::CodeDenied)));
    }

    #[tokio::test]
    async fn account_without_enrollment_cannot_verify() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let verification = MockVerificationClient::accepting("123456");
        let account = store
            .add_account(parent_registration("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        let use_case = VerifyLoginUseCase::new(&store, &verification);
        let result = use_case.execute(account.id, "123456").await;
        assert!(matches!(result, Err(VerifyLoginError::CodeDenied)));
    }
}
