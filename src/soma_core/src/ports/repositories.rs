use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    account::{Account, NewAccount, Role},
    attendance::{AttendanceRecord, NewAttendanceRecord},
    drafts::{DraftUpdate, EmailDraft, NewEmailDraft},
    email::EmailAddress,
    newsletter::Subscriber,
    password::Password,
    username::Username,
};

// AccountStore port trait and errors
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("Username or email already in use")]
    DuplicateIdentity,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for AccountStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateIdentity, Self::DuplicateIdentity) => true,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::NotFound, Self::NotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Persistence for accounts and their role payloads. Owns credential
/// hashing: [`add_account`] and [`set_password`] receive plaintext and store
/// only a hash.
///
/// [`add_account`]: AccountStore::add_account
/// [`set_password`]: AccountStore::set_password
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account. `DuplicateIdentity` when the username or email
    /// is already taken; no partial row survives a failure.
    async fn add_account(&self, account: NewAccount) -> Result<Account, AccountStoreError>;

    /// Check credentials. Unknown username, wrong password, and deactivated
    /// account all surface as `InvalidCredentials`.
    async fn authenticate(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<Account, AccountStoreError>;

    async fn get_account(&self, id: Uuid) -> Result<Account, AccountStoreError>;

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountStoreError>;

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountStoreError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, AccountStoreError>;

    /// Idempotent activation toggle. No notification is sent from this layer.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AccountStoreError>;

    async fn set_pending_deletion(
        &self,
        id: Uuid,
        pending: bool,
    ) -> Result<(), AccountStoreError>;

    /// Replace the stored credential. The previous hash is invalid as soon
    /// as this returns.
    async fn set_password(
        &self,
        id: Uuid,
        new_password: Password,
    ) -> Result<(), AccountStoreError>;

    /// Remove the account, its role payload, and dependent records: a
    /// teacher's attendance log and a parent's linked student accounts.
    async fn delete_account(&self, id: Uuid) -> Result<(), AccountStoreError>;
}

// AttendanceStore port trait and errors
#[derive(Debug, Error)]
pub enum AttendanceStoreError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn record(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceStoreError>;

    async fn list_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<AttendanceRecord>, AttendanceStoreError>;

    async fn delete_for_teacher(&self, teacher_id: Uuid) -> Result<(), AttendanceStoreError>;
}

// SubscriberStore port trait and errors
#[derive(Debug, Error)]
pub enum SubscriberStoreError {
    #[error("Email already subscribed")]
    DuplicateIdentity,
    #[error("Subscriber not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for SubscriberStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateIdentity, Self::DuplicateIdentity) => true,
            (Self::NotFound, Self::NotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Unsubscribed,
    AlreadyUnsubscribed,
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Enroll a verified address. Counter starts at zero, status true,
    /// confirmation timestamp now.
    async fn add_subscriber(
        &self,
        email: EmailAddress,
    ) -> Result<Subscriber, SubscriberStoreError>;

    async fn find(&self, email: &EmailAddress)
        -> Result<Option<Subscriber>, SubscriberStoreError>;

    /// Idempotent; reports whether the address was already unsubscribed.
    async fn unsubscribe(
        &self,
        email: &EmailAddress,
    ) -> Result<UnsubscribeOutcome, SubscriberStoreError>;

    async fn resubscribe(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError>;

    async fn delete(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError>;

    /// All subscribers whose subscription is currently active.
    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, SubscriberStoreError>;

    /// Active subscribers that have not received any newsletter yet.
    async fn unsent_subscribers(&self) -> Result<Vec<Subscriber>, SubscriberStoreError>;

    async fn mark_sent(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError>;
}

// DraftStore port trait and errors
#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("Draft not found")]
    NotFound,
    #[error("Draft has already been dispatched")]
    AlreadyDispatched,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for DraftStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound, Self::NotFound) => true,
            (Self::AlreadyDispatched, Self::AlreadyDispatched) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn add_draft(&self, draft: NewEmailDraft) -> Result<EmailDraft, DraftStoreError>;

    async fn get_draft(&self, id: Uuid) -> Result<EmailDraft, DraftStoreError>;

    async fn list_drafts(&self) -> Result<Vec<EmailDraft>, DraftStoreError>;

    /// Replace draft content. Fails with `AlreadyDispatched` once sent.
    async fn update_draft(
        &self,
        id: Uuid,
        update: DraftUpdate,
    ) -> Result<EmailDraft, DraftStoreError>;

    /// Fails with `AlreadyDispatched` once sent.
    async fn delete_draft(&self, id: Uuid) -> Result<(), DraftStoreError>;

    async fn set_allowed(&self, id: Uuid, allowed: bool) -> Result<(), DraftStoreError>;

    /// Record the single dispatch. Fails with `AlreadyDispatched` when a
    /// dispatch timestamp is already present.
    async fn mark_dispatched(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DraftStoreError>;
}
