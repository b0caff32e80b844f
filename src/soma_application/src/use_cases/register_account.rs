use soma_core::{Account, AccountStore, AccountStoreError, FieldError, RegistrationRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegisterAccountError {
    #[error("Registration form has invalid fields")]
    Validation(Vec<FieldError>),
    #[error("Username or email already in use")]
    DuplicateIdentity,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Registration for any role. Field validation aggregates every failure;
/// which roles a caller may create is enforced at the route layer.
pub struct RegisterAccountUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    account_store: &'a A,
}

impl<'a, A> RegisterAccountUseCase<'a, A>
where
    A: AccountStore + ?Sized,
{
    pub fn new(account_store: &'a A) -> Self {
        Self { account_store }
    }

    #[tracing::instrument(name = "RegisterAccountUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        request: RegistrationRequest,
    ) -> Result<Account, RegisterAccountError> {
        let account = request
            .validate()
            .map_err(RegisterAccountError::Validation)?;

        self.account_store
            .add_account(account)
            .await
            .map_err(|e| match e {
                AccountStoreError::DuplicateIdentity => RegisterAccountError::DuplicateIdentity,
                other => RegisterAccountError::UnexpectedError(other.to_string()),
            })
    }
}
