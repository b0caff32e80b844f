use uuid::Uuid;

use soma_core::{AccountStore, AccountStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestAccountDeletionError {
    #[error("Account not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// User-initiated deletion request. Flags the account for an admin to
/// confirm later; nothing is removed here.
pub struct RequestAccountDeletionUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    account_store: &'a A,
}

impl<'a, A> RequestAccountDeletionUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    pub fn new(account_store: &'a A) -> Self {
        Self { account_store }
    }

    #[tracing::instrument(name = "RequestAccountDeletionUseCase::execute", skip_all, fields(account_id = %id))]
    pub async fn execute(&self, id: Uuid) -> Result<(), RequestAccountDeletionError> {
        self.account_store
            .set_pending_deletion(id, true)
            .await
            .map_err(|e| match e {
                AccountStoreError::NotFound => RequestAccountDeletionError::NotFound,
                other => RequestAccountDeletionError::UnexpectedError(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::parent_registration;
    use soma_adapters::{InMemoryAccountStore, InMemoryAttendanceStore};

    #[tokio::test]
    async fn flags_the_account_without_removing_it() {
        let store = InMemoryAccountStore::new(InMemoryAttendanceStore::new());
        let account = store
            .add_account(parent_registration("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        RequestAccountDeletionUseCase::new(&store)
            .execute(account.id)
            .await
            .unwrap();

        let flagged = store.get_account(account.id).await.unwrap();
        assert!(flagged.pending_deletion);
        assert!(flagged.active);
    }
}
