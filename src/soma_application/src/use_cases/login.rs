use soma_core::{Account, AccountStore, AccountStoreError, Password, Username, VerificationClient};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Outcome of a credential check. Two-factor-enrolled accounts get a code
/// sent to their verification phone and must complete the second step.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(Account),
    RequiresVerification(Account),
}

pub struct LoginUseCase<'a, A, V>
where
    A: AccountStore + ?Sized,
    V: VerificationClient + ?Sized,
{
    account_store: &'a A,
    verification_client: &'a V,
}

impl<'a, A, V> LoginUseCase<'a, A, V>
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

    /// Unknown username, wrong password, and deactivated account are all
    /// reported as `InvalidCredentials`.
    #[tracing::instrument(name = "LoginUseCase::execute", skip_all, fields(username = %username))]
    pub async fn execute(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<LoginOutcome, LoginError> {
        let account = self
            .account_store
            .authenticate(username, password)
            .await
            .map_err(|e| match e {
                AccountStoreError::InvalidCredentials | AccountStoreError::NotFound => {
                    LoginError::InvalidCredentials
                }
                other => LoginError::UnexpectedError(other.to_string()),
            })?;

        if let Some(verification_phone) = &account.verification_phone {
            self.verification_client
                .request_code(verification_phone.as_str())
                .await
                .map_err(LoginError::UnexpectedError)?;
            return Ok(LoginOutcome::RequiresVerification(account));
        }

        Ok(LoginOutcome::Success(account))
    }
}
