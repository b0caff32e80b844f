use uuid::Uuid;

use soma_core::{AccountStore, AccountStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetAccountActiveError {
    #[error("Account not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Reversible deactivation toggle. A deactivated account keeps its data and
/// cannot log in; no notification is sent either way.
pub struct SetAccountActiveUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    account_store: &'a A,
}

impl<'a, A> SetAccountActiveUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    pub fn new(account_store: &'a A) -> Self {
        Self { account_store }
    }

    #[tracing::instrument(name = "SetAccountActiveUseCase::execute", skip_all, fields(account_id = %id, active))]
    pub async fn execute(&self, id: Uuid, active: bool) -> Result<(), SetAccountActiveError> {
        self.account_store
            .set_active(id, active)
            .await
            .map_err(|e| match e {
                AccountStoreError::NotFound => SetAccountActiveError::NotFound,
                other => SetAccountActiveError::UnexpectedError(other.to_string()),
            })
    }
}
