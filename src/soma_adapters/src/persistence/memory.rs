//! In-memory stores backed by `Arc<RwLock<HashMap>>`, for tests and local
//! runs without a database. Semantics mirror the Postgres stores, including
//! the parent→student and teacher→attendance cascades.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::Secret;
use tokio::sync::RwLock;
use uuid::Uuid;

use soma_core::{
    Account, AccountStore, AccountStoreError, AttendanceRecord, AttendanceStore,
    AttendanceStoreError, DraftStore, DraftStoreError, DraftUpdate, EmailAddress, EmailDraft,
    NewAccount, NewAttendanceRecord, NewEmailDraft, Password, Role, RoleDetails, Subscriber,
    SubscriberStore, SubscriberStoreError, UnsubscribeOutcome, Username,
};

use crate::credentials::{compute_password_hash, verify_password_hash};

#[derive(Clone)]
struct StoredAccount {
    account: Account,
    password_hash: Secret<String>,
}

#[derive(Default, Clone)]
pub struct InMemoryAttendanceStore {
    records: Arc<RwLock<Vec<AttendanceRecord>>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn record(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceStoreError> {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            student_first_name: record.student_first_name,
            program: record.program,
            cohort: record.cohort,
            program_schedule: record.program_schedule,
            lesson_number: record.lesson_number,
            hours: record.hours,
            lesson_date: record.lesson_date,
            teacher_id: record.teacher_id,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<AttendanceRecord>, AttendanceStoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.teacher_id == teacher_id)
            .cloned()
            .collect())
    }

    async fn delete_for_teacher(&self, teacher_id: Uuid) -> Result<(), AttendanceStoreError> {
        self.records
            .write()
            .await
            .retain(|r| r.teacher_id != teacher_id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, StoredAccount>>>,
    attendance: InMemoryAttendanceStore,
}

impl InMemoryAccountStore {
    /// Shares the attendance store so that deleting a teacher account drops
    /// the teacher's attendance log, matching the database cascade.
    pub fn new(attendance: InMemoryAttendanceStore) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            attendance,
        }
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn add_account(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        let password_hash = compute_password_hash(account.password.clone())
            .await
            .map_err(AccountStoreError::UnexpectedError)?;

        let mut accounts = self.accounts.write().await;
        let taken = accounts.values().any(|stored| {
            stored.account.username == account.username || stored.account.email == account.email
        });
        if taken {
            return Err(AccountStoreError::DuplicateIdentity);
        }

        let stored = Account {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            username: account.username,
            email: account.email,
            phone_number: account.phone_number,
            verification_phone: account.verification_phone,
            active: true,
            pending_deletion: false,
            registered_at: Utc::now(),
            details: account.details,
        };
        accounts.insert(
            stored.id,
            StoredAccount {
                account: stored.clone(),
                password_hash,
            },
        );
        Ok(stored)
    }

    async fn authenticate(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<Account, AccountStoreError> {
        let stored = {
            let accounts = self.accounts.read().await;
            accounts
                .values()
                .find(|stored| &stored.account.username == username)
                .cloned()
                .ok_or(AccountStoreError::InvalidCredentials)?
        };

        if !stored.account.active {
            return Err(AccountStoreError::InvalidCredentials);
        }

        verify_password_hash(stored.password_hash.clone(), password.clone())
            .await
            .map_err(|_| AccountStoreError::InvalidCredentials)?;

        Ok(stored.account)
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, AccountStoreError> {
        let accounts = self.accounts.read().await;
        accounts
            .get(&id)
            .map(|stored| stored.account.clone())
            .ok_or(AccountStoreError::NotFound)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountStoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|stored| &stored.account.username == username)
            .map(|stored| stored.account.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountStoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|stored| &stored.account.email == email)
            .map(|stored| stored.account.clone()))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, AccountStoreError> {
        let accounts = self.accounts.read().await;
        let mut matching: Vec<Account> = accounts
            .values()
            .filter(|stored| stored.account.role() == role)
            .map(|stored| stored.account.clone())
            .collect();
        matching.sort_by_key(|a| a.registered_at);
        Ok(matching)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts.get_mut(&id).ok_or(AccountStoreError::NotFound)?;
        stored.account.active = active;
        Ok(())
    }

    async fn set_pending_deletion(
        &self,
        id: Uuid,
        pending: bool,
    ) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts.get_mut(&id).ok_or(AccountStoreError::NotFound)?;
        stored.account.pending_deletion = pending;
        Ok(())
    }

    async fn set_password(
        &self,
        id: Uuid,
        new_password: Password,
    ) -> Result<(), AccountStoreError> {
        let password_hash = compute_password_hash(new_password)
            .await
            .map_err(AccountStoreError::UnexpectedError)?;

        let mut accounts = self.accounts.write().await;
        let stored = accounts.get_mut(&id).ok_or(AccountStoreError::NotFound)?;
        stored.password_hash = password_hash;
        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let cascaded_teachers = {
            let mut accounts = self.accounts.write().await;
            let removed = accounts.remove(&id).ok_or(AccountStoreError::NotFound)?;

            let mut teachers = Vec::new();
            if removed.account.role() == Role::Teacher {
                teachers.push(id);
            }

            // A deleted parent takes linked students along with it.
            if removed.account.role() == Role::Parent {
                let linked: Vec<Uuid> = accounts
                    .values()
                    .filter(|stored| {
                        matches!(
                            stored.account.details,
                            RoleDetails::Student {
                                parent_id: Some(parent_id),
                                ..
                            } if parent_id == id
                        )
                    })
                    .map(|stored| stored.account.id)
                    .collect();
                for student_id in linked {
                    accounts.remove(&student_id);
                }
            }
            teachers
        };

        for teacher_id in cascaded_teachers {
            self.attendance
                .delete_for_teacher(teacher_id)
                .await
                .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySubscriberStore {
    subscribers: Arc<RwLock<HashMap<EmailAddress, Subscriber>>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn add_subscriber(
        &self,
        email: EmailAddress,
    ) -> Result<Subscriber, SubscriberStoreError> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.contains_key(&email) {
            return Err(SubscriberStoreError::DuplicateIdentity);
        }
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: email.clone(),
            subscription_status: true,
            newsletters_sent: 0,
            confirmed_at: Utc::now(),
        };
        subscribers.insert(email, subscriber.clone());
        Ok(subscriber)
    }

    async fn find(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, SubscriberStoreError> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.get(email).cloned())
    }

    async fn unsubscribe(
        &self,
        email: &EmailAddress,
    ) -> Result<UnsubscribeOutcome, SubscriberStoreError> {
        let mut subscribers = self.subscribers.write().await;
        let subscriber = subscribers
            .get_mut(email)
            .ok_or(SubscriberStoreError::NotFound)?;
        if !subscriber.subscription_status {
            return Ok(UnsubscribeOutcome::AlreadyUnsubscribed);
        }
        subscriber.subscription_status = false;
        Ok(UnsubscribeOutcome::Unsubscribed)
    }

    async fn resubscribe(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError> {
        let mut subscribers = self.subscribers.write().await;
        let subscriber = subscribers
            .get_mut(email)
            .ok_or(SubscriberStoreError::NotFound)?;
        subscriber.subscription_status = true;
        Ok(())
    }

    async fn delete(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError> {
        let mut subscribers = self.subscribers.write().await;
        subscribers
            .remove(email)
            .map(|_| ())
            .ok_or(SubscriberStoreError::NotFound)
    }

    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, SubscriberStoreError> {
        let subscribers = self.subscribers.read().await;
        let mut active: Vec<Subscriber> = subscribers
            .values()
            .filter(|s| s.subscription_status)
            .cloned()
            .collect();
        active.sort_by_key(|s| s.confirmed_at);
        Ok(active)
    }

    async fn unsent_subscribers(&self) -> Result<Vec<Subscriber>, SubscriberStoreError> {
        let subscribers = self.subscribers.read().await;
        let mut unsent: Vec<Subscriber> = subscribers
            .values()
            .filter(|s| s.subscription_status && s.newsletters_sent == 0)
            .cloned()
            .collect();
        unsent.sort_by_key(|s| s.confirmed_at);
        Ok(unsent)
    }

    async fn mark_sent(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError> {
        let mut subscribers = self.subscribers.write().await;
        let subscriber = subscribers
            .get_mut(email)
            .ok_or(SubscriberStoreError::NotFound)?;
        subscriber.newsletters_sent = 1;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryDraftStore {
    drafts: Arc<RwLock<HashMap<Uuid, EmailDraft>>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn add_draft(&self, draft: NewEmailDraft) -> Result<EmailDraft, DraftStoreError> {
        let draft = EmailDraft {
            id: Uuid::new_v4(),
            subject: draft.subject,
            body: draft.body,
            closing: draft.closing,
            signature: draft.signature,
            bulk_category: draft.bulk_category,
            allow_send: false,
            dispatched_at: None,
            created_at: Utc::now(),
            author_id: draft.author_id,
        };
        self.drafts.write().await.insert(draft.id, draft.clone());
        Ok(draft)
    }

    async fn get_draft(&self, id: Uuid) -> Result<EmailDraft, DraftStoreError> {
        let drafts = self.drafts.read().await;
        drafts.get(&id).cloned().ok_or(DraftStoreError::NotFound)
    }

    async fn list_drafts(&self) -> Result<Vec<EmailDraft>, DraftStoreError> {
        let drafts = self.drafts.read().await;
        let mut all: Vec<EmailDraft> = drafts.values().cloned().collect();
        all.sort_by_key(|d| d.created_at);
        Ok(all)
    }

    async fn update_draft(
        &self,
        id: Uuid,
        update: DraftUpdate,
    ) -> Result<EmailDraft, DraftStoreError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(&id).ok_or(DraftStoreError::NotFound)?;
        if draft.dispatched() {
            return Err(DraftStoreError::AlreadyDispatched);
        }
        draft.subject = update.subject;
        draft.body = update.body;
        draft.closing = update.closing;
        draft.signature = update.signature;
        draft.bulk_category = update.bulk_category;
        Ok(draft.clone())
    }

    async fn delete_draft(&self, id: Uuid) -> Result<(), DraftStoreError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get(&id).ok_or(DraftStoreError::NotFound)?;
        if draft.dispatched() {
            return Err(DraftStoreError::AlreadyDispatched);
        }
        drafts.remove(&id);
        Ok(())
    }

    async fn set_allowed(&self, id: Uuid, allowed: bool) -> Result<(), DraftStoreError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(&id).ok_or(DraftStoreError::NotFound)?;
        draft.allow_send = allowed;
        Ok(())
    }

    async fn mark_dispatched(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DraftStoreError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(&id).ok_or(DraftStoreError::NotFound)?;
        if draft.dispatched() {
            return Err(DraftStoreError::AlreadyDispatched);
        }
        draft.dispatched_at = Some(at);
        Ok(())
    }
}
