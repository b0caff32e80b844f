use soma_core::{AccountStore, AccountStoreError, Password};
use thiserror::Error;

use crate::tokens;

#[derive(Debug, Error)]
pub enum ResetPasswordError {
    #[error("Reset link is expired or invalid")]
    TokenExpiredOrInvalid,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Completes a password reset from an emailed link. A bad signature, an
/// expired token, and an account deleted since the link was issued all read
/// the same to the caller.
pub struct ResetPasswordUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    account_store: &'a A,
    signing_key: &'a [u8],
}

impl<'a, A> ResetPasswordUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    pub fn new(account_store: &'a A, signing_key: &'a [u8]) -> Self {
        Self {
            account_store,
            signing_key,
        }
    }

    #[tracing::instrument(name = "ResetPasswordUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        token: &str,
        new_password: Password,
    ) -> Result<(), ResetPasswordError> {
        let account_id = tokens::verify_reset_token(token, self.signing_key)
            .ok_or(ResetPasswordError::TokenExpiredOrInvalid)?;

        self.account_store
            .set_password(account_id, new_password)
            .await
            .map_err(|e| match e {
                AccountStoreError::NotFound => ResetPasswordError::TokenExpiredOrInvalid,
                other => ResetPasswordError::UnexpectedError(other.to_string()),
            })
    }
}
