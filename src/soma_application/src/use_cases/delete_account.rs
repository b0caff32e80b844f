use uuid::Uuid;

use soma_core::{AccountStore, AccountStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteAccountError {
    #[error("Account not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Permanent removal. Deleting a teacher drops their attendance log;
/// deleting a parent also removes the students linked to them.
pub struct DeleteAccountUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    account_store: &'a A,
}

impl<'a, A> DeleteAccountUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    pub fn new(account_store: &'a A) -> Self {
        Self { account_store }
    }

    #[tracing::instrument(name = "DeleteAccountUseCase::execute", skip_all, fields(account_id = %id))]
    pub async fn execute(&self, id: Uuid) -> Result<(), DeleteAccountError> {
        self.account_store
            .delete_account(id)
            .await
            .map_err(|e| match e {
                AccountStoreError::NotFound => DeleteAccountError::NotFound,
                other => DeleteAccountError::UnexpectedError(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::parent_registration;
    use soma_adapters::{InMemoryAccountStore, InMemoryAttendanceStore};

    #[tokio::test]
    async fn deleted_account_is_gone() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let account = store
            .add_account(parent_registration("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        DeleteAccountUseCase::new(&store)
            .execute(account.id)
            .await
            .unwrap();

        assert!(store.get_account(account.id).await.is_err());
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let account = store
            .add_account(parent_registration("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        let use_case = DeleteAccountUseCase::new(&store);
        use_case.execute(account.id).await.unwrap();
        let result = use_case.execute(account.id).await;
        assert!(matches!(result, Err(DeleteAccountError::NotFound)));
    }
}
