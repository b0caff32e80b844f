//! Postgres-backed stores. Role payloads live in per-role profile tables
//! joined onto the shared `accounts` table; profile and attendance rows ride
//! on `ON DELETE CASCADE`, while the parent→student cascade is applied here
//! inside a transaction because it crosses account rows.

use chrono::{DateTime, Utc};
use secrecy::Secret;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use soma_core::{
    Account, AccountStore, AccountStoreError, AttendanceRecord, AttendanceStore,
    AttendanceStoreError, DraftStore, DraftStoreError, DraftUpdate, EmailAddress, EmailDraft,
    NewAccount, NewAttendanceRecord, NewEmailDraft, Password, PhoneNumber, Role, RoleDetails,
    Subscriber, SubscriberStore, SubscriberStoreError, UnsubscribeOutcome, Username,
};

use crate::credentials::{compute_password_hash, verify_password_hash};

const ACCOUNT_SELECT: &str = r#"
    SELECT a.id, a.first_name, a.last_name, a.username, a.email, a.phone_number,
           a.verification_phone, a.active, a.pending_deletion, a.registered_at, a.role,
           pp.residence AS parent_residence,
           sp.age, sp.school, sp.coding_experience, sp.program, sp.program_schedule,
           sp.cohort, sp.parent_id,
           tp.course, tp.residence AS teacher_residence,
           ap.residence AS admin_residence, ap.department
    FROM accounts a
    LEFT JOIN parent_profiles pp ON pp.account_id = a.id
    LEFT JOIN student_profiles sp ON sp.account_id = a.id
    LEFT JOIN teacher_profiles tp ON tp.account_id = a.id
    LEFT JOIN admin_profiles ap ON ap.account_id = a.id
"#;

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountStoreError> {
    let unexpected = |e: sqlx::Error| AccountStoreError::UnexpectedError(e.to_string());
    let invalid =
        |e: &dyn std::fmt::Display| AccountStoreError::UnexpectedError(e.to_string());

    let role: Role = row
        .try_get::<String, _>("role")
        .map_err(unexpected)?
        .parse()
        .map_err(|e| invalid(&e))?;

    let details = match role {
        Role::Parent => RoleDetails::Parent {
            residence: row
                .try_get("parent_residence")
                .map_err(unexpected)?,
        },
        Role::Student => RoleDetails::Student {
            age: row
                .try_get::<i32, _>("age")
                .map_err(unexpected)?
                .try_into()
                .map_err(|_| {
                    AccountStoreError::UnexpectedError("Stored age out of range".to_string())
                })?,
            school: row.try_get("school").map_err(unexpected)?,
            coding_experience: row
                .try_get("coding_experience")
                .map_err(unexpected)?,
            program: row.try_get("program").map_err(unexpected)?,
            program_schedule: row
                .try_get("program_schedule")
                .map_err(unexpected)?,
            cohort: row.try_get("cohort").map_err(unexpected)?,
            parent_id: row.try_get("parent_id").map_err(unexpected)?,
        },
        Role::Teacher => RoleDetails::Teacher {
            course: row.try_get("course").map_err(unexpected)?,
            residence: row
                .try_get("teacher_residence")
                .map_err(unexpected)?,
        },
        Role::Admin => RoleDetails::Admin {
            residence: row
                .try_get("admin_residence")
                .map_err(unexpected)?,
            department: row
                .try_get("department")
                .map_err(unexpected)?,
        },
    };

    Ok(Account {
        id: row.try_get("id").map_err(unexpected)?,
        first_name: row
            .try_get("first_name")
            .map_err(unexpected)?,
        last_name: row
            .try_get("last_name")
            .map_err(unexpected)?,
        username: Username::try_from(
            row.try_get::<String, _>("username")
                .map_err(unexpected)?,
        )
        .map_err(|e| invalid(&e))?,
        email: EmailAddress::try_from(
            row.try_get::<String, _>("email")
                .map_err(unexpected)?,
        )
        .map_err(|e| invalid(&e))?,
        phone_number: PhoneNumber::try_from(
            row.try_get::<String, _>("phone_number")
                .map_err(unexpected)?,
        )
        .map_err(|e| invalid(&e))?,
        verification_phone: row
            .try_get::<Option<String>, _>("verification_phone")
            .map_err(unexpected)?
            .map(PhoneNumber::try_from)
            .transpose()
            .map_err(|e| invalid(&e))?,
        active: row.try_get("active").map_err(unexpected)?,
        pending_deletion: row
            .try_get("pending_deletion")
            .map_err(unexpected)?,
        registered_at: row
            .try_get("registered_at")
            .map_err(unexpected)?,
        details,
    })
}

#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_account_where(
        &self,
        clause: &str,
        bind: &str,
    ) -> Result<Option<Account>, AccountStoreError> {
        let query = format!("{ACCOUNT_SELECT} WHERE {clause}");
        let row = sqlx::query(&query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        row.as_ref().map(account_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[tracing::instrument(name = "Adding account to Postgres", skip_all, fields(username = %account.username))]
    async fn add_account(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        let password_hash: Secret<String> = compute_password_hash(account.password.clone())
            .await
            .map_err(AccountStoreError::UnexpectedError)?;

        let id = Uuid::new_v4();
        let registered_at = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, first_name, last_name, username, email, phone_number,
                 verification_phone, password_hash, active, pending_deletion,
                 registered_at, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, FALSE, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(account.phone_number.as_str())
        .bind(account.verification_phone.as_ref().map(PhoneNumber::as_str))
        .bind(secrecy::ExposeSecret::expose_secret(&password_hash))
        .bind(registered_at)
        .bind(account.role().as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccountStoreError::DuplicateIdentity
            } else {
                AccountStoreError::UnexpectedError(e.to_string())
            }
        })?;

        match &account.details {
            RoleDetails::Parent { residence } => {
                sqlx::query(
                    "INSERT INTO parent_profiles (account_id, residence) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(residence)
                .execute(&mut *tx)
                .await
            }
            RoleDetails::Student {
                age,
                school,
                coding_experience,
                program,
                program_schedule,
                cohort,
                parent_id,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO student_profiles
                        (account_id, age, school, coding_experience, program,
                         program_schedule, cohort, parent_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(id)
                .bind(i32::from(*age))
                .bind(school)
                .bind(coding_experience)
                .bind(program)
                .bind(program_schedule)
                .bind(cohort)
                .bind(parent_id)
                .execute(&mut *tx)
                .await
            }
            RoleDetails::Teacher { course, residence } => {
                sqlx::query(
                    "INSERT INTO teacher_profiles (account_id, course, residence) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(course)
                .bind(residence)
                .execute(&mut *tx)
                .await
            }
            RoleDetails::Admin {
                residence,
                department,
            } => {
                sqlx::query(
                    "INSERT INTO admin_profiles (account_id, residence, department) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(residence)
                .bind(department)
                .execute(&mut *tx)
                .await
            }
        }
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        Ok(Account {
            id,
            first_name: account.first_name,
            last_name: account.last_name,
            username: account.username,
            email: account.email,
            phone_number: account.phone_number,
            verification_phone: account.verification_phone,
            active: true,
            pending_deletion: false,
            registered_at,
            details: account.details,
        })
    }

    #[tracing::instrument(name = "Validating credentials against Postgres", skip_all)]
    async fn authenticate(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<Account, AccountStoreError> {
        let row = sqlx::query("SELECT id, active, password_hash FROM accounts WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?
            .ok_or(AccountStoreError::InvalidCredentials)?;

        let active: bool = row
            .try_get("active")
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if !active {
            return Err(AccountStoreError::InvalidCredentials);
        }

        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        verify_password_hash(Secret::from(password_hash), password.clone())
            .await
            .map_err(|_| AccountStoreError::InvalidCredentials)?;

        let id: Uuid = row
            .try_get("id")
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        self.get_account(id).await
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, AccountStoreError> {
        let query = format!("{ACCOUNT_SELECT} WHERE a.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?
            .ok_or(AccountStoreError::NotFound)?;
        account_from_row(&row)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountStoreError> {
        self.fetch_account_where("a.username = $1", username.as_str())
            .await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountStoreError> {
        self.fetch_account_where("a.email = $1", email.as_str())
            .await
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, AccountStoreError> {
        let query = format!("{ACCOUNT_SELECT} WHERE a.role = $1 ORDER BY a.registered_at");
        let rows = sqlx::query(&query)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        rows.iter().map(account_from_row).collect()
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AccountStoreError> {
        let result = sqlx::query("UPDATE accounts SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(AccountStoreError::NotFound);
        }
        Ok(())
    }

    async fn set_pending_deletion(
        &self,
        id: Uuid,
        pending: bool,
    ) -> Result<(), AccountStoreError> {
        let result = sqlx::query("UPDATE accounts SET pending_deletion = $2 WHERE id = $1")
            .bind(id)
            .bind(pending)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(AccountStoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Replacing stored credential", skip_all)]
    async fn set_password(
        &self,
        id: Uuid,
        new_password: Password,
    ) -> Result<(), AccountStoreError> {
        let password_hash = compute_password_hash(new_password)
            .await
            .map_err(AccountStoreError::UnexpectedError)?;

        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(secrecy::ExposeSecret::expose_secret(&password_hash))
            .execute(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(AccountStoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Deleting account from Postgres", skip_all, fields(account_id = %id))]
    async fn delete_account(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        let role: String = sqlx::query("SELECT role FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?
            .ok_or(AccountStoreError::NotFound)?
            .try_get("role")
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        if role == Role::Parent.as_str() {
            sqlx::query(
                r#"
                DELETE FROM accounts
                WHERE id IN (SELECT account_id FROM student_profiles WHERE parent_id = $1)
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        }

        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))
    }
}

#[derive(Clone)]
pub struct PostgresAttendanceStore {
    pool: PgPool,
}

impl PostgresAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn attendance_from_row(row: &PgRow) -> Result<AttendanceRecord, AttendanceStoreError> {
    let unexpected = |e: sqlx::Error| AttendanceStoreError::UnexpectedError(e.to_string());
    Ok(AttendanceRecord {
        id: row.try_get("id").map_err(unexpected)?,
        student_first_name: row.try_get("student_first_name").map_err(unexpected)?,
        program: row.try_get("program").map_err(unexpected)?,
        cohort: row.try_get("cohort").map_err(unexpected)?,
        program_schedule: row.try_get("program_schedule").map_err(unexpected)?,
        lesson_number: row.try_get("lesson_number").map_err(unexpected)?,
        hours: row.try_get("hours").map_err(unexpected)?,
        lesson_date: row.try_get("lesson_date").map_err(unexpected)?,
        teacher_id: row.try_get("teacher_id").map_err(unexpected)?,
    })
}

#[async_trait::async_trait]
impl AttendanceStore for PostgresAttendanceStore {
    async fn record(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceStoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO attendance_records
                (id, student_first_name, program, cohort, program_schedule,
                 lesson_number, hours, lesson_date, teacher_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(&record.student_first_name)
        .bind(&record.program)
        .bind(&record.cohort)
        .bind(&record.program_schedule)
        .bind(record.lesson_number)
        .bind(record.hours)
        .bind(record.lesson_date)
        .bind(record.teacher_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AttendanceStoreError::UnexpectedError(e.to_string()))?;

        Ok(AttendanceRecord {
            id,
            student_first_name: record.student_first_name,
            program: record.program,
            cohort: record.cohort,
            program_schedule: record.program_schedule,
            lesson_number: record.lesson_number,
            hours: record.hours,
            lesson_date: record.lesson_date,
            teacher_id: record.teacher_id,
        })
    }

    async fn list_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<AttendanceRecord>, AttendanceStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_first_name, program, cohort, program_schedule,
                   lesson_number, hours, lesson_date, teacher_id
            FROM attendance_records
            WHERE teacher_id = $1
            ORDER BY lesson_date
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AttendanceStoreError::UnexpectedError(e.to_string()))?;
        rows.iter().map(attendance_from_row).collect()
    }

    async fn delete_for_teacher(&self, teacher_id: Uuid) -> Result<(), AttendanceStoreError> {
        sqlx::query("DELETE FROM attendance_records WHERE teacher_id = $1")
            .bind(teacher_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AttendanceStoreError::UnexpectedError(e.to_string()))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresSubscriberStore {
    pool: PgPool,
}

impl PostgresSubscriberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn subscriber_from_row(row: &PgRow) -> Result<Subscriber, SubscriberStoreError> {
    let unexpected = |e: sqlx::Error| SubscriberStoreError::UnexpectedError(e.to_string());
    Ok(Subscriber {
        id: row.try_get("id").map_err(unexpected)?,
        email: EmailAddress::try_from(
            row.try_get::<String, _>("email").map_err(unexpected)?,
        )
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?,
        subscription_status: row.try_get("subscription_status").map_err(unexpected)?,
        newsletters_sent: row.try_get("newsletters_sent").map_err(unexpected)?,
        confirmed_at: row.try_get("confirmed_at").map_err(unexpected)?,
    })
}

#[async_trait::async_trait]
impl SubscriberStore for PostgresSubscriberStore {
    #[tracing::instrument(name = "Adding subscriber to Postgres", skip_all, fields(email = %email))]
    async fn add_subscriber(
        &self,
        email: EmailAddress,
    ) -> Result<Subscriber, SubscriberStoreError> {
        let id = Uuid::new_v4();
        let confirmed_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers
                (id, email, subscription_status, newsletters_sent, confirmed_at)
            VALUES ($1, $2, TRUE, 0, $3)
            "#,
        )
        .bind(id)
        .bind(email.as_str())
        .bind(confirmed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                SubscriberStoreError::DuplicateIdentity
            } else {
                SubscriberStoreError::UnexpectedError(e.to_string())
            }
        })?;

        Ok(Subscriber {
            id,
            email,
            subscription_status: true,
            newsletters_sent: 0,
            confirmed_at,
        })
    }

    async fn find(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, SubscriberStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, subscription_status, newsletters_sent, confirmed_at
            FROM newsletter_subscribers
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;
        row.as_ref().map(subscriber_from_row).transpose()
    }

    async fn unsubscribe(
        &self,
        email: &EmailAddress,
    ) -> Result<UnsubscribeOutcome, SubscriberStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET subscription_status = FALSE
            WHERE email = $1 AND subscription_status = TRUE
            "#,
        )
        .bind(email.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(UnsubscribeOutcome::Unsubscribed);
        }
        match self.find(email).await? {
            Some(_) => Ok(UnsubscribeOutcome::AlreadyUnsubscribed),
            None => Err(SubscriberStoreError::NotFound),
        }
    }

    async fn resubscribe(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError> {
        let result = sqlx::query(
            "UPDATE newsletter_subscribers SET subscription_status = TRUE WHERE email = $1",
        )
        .bind(email.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(SubscriberStoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError> {
        let result = sqlx::query("DELETE FROM newsletter_subscribers WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(SubscriberStoreError::NotFound);
        }
        Ok(())
    }

    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, SubscriberStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, subscription_status, newsletters_sent, confirmed_at
            FROM newsletter_subscribers
            WHERE subscription_status = TRUE
            ORDER BY confirmed_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;
        rows.iter().map(subscriber_from_row).collect()
    }

    async fn unsent_subscribers(&self) -> Result<Vec<Subscriber>, SubscriberStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, subscription_status, newsletters_sent, confirmed_at
            FROM newsletter_subscribers
            WHERE subscription_status = TRUE AND newsletters_sent = 0
            ORDER BY confirmed_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;
        rows.iter().map(subscriber_from_row).collect()
    }

    async fn mark_sent(&self, email: &EmailAddress) -> Result<(), SubscriberStoreError> {
        let result = sqlx::query(
            "UPDATE newsletter_subscribers SET newsletters_sent = 1 WHERE email = $1",
        )
        .bind(email.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SubscriberStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(SubscriberStoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresDraftStore {
    pool: PgPool,
}

impl PostgresDraftStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguish a missing draft from one that exists but has already been
    /// dispatched, after a guarded update matched zero rows.
    async fn missing_or_dispatched(&self, id: Uuid) -> DraftStoreError {
        match self.get_draft(id).await {
            Ok(draft) if draft.dispatched() => DraftStoreError::AlreadyDispatched,
            Ok(_) => DraftStoreError::UnexpectedError(
                "Guarded draft update matched no rows".to_string(),
            ),
            Err(e) => e,
        }
    }
}

fn draft_from_row(row: &PgRow) -> Result<EmailDraft, DraftStoreError> {
    let unexpected = |e: sqlx::Error| DraftStoreError::UnexpectedError(e.to_string());
    Ok(EmailDraft {
        id: row.try_get("id").map_err(unexpected)?,
        subject: row.try_get("subject").map_err(unexpected)?,
        body: row.try_get("body").map_err(unexpected)?,
        closing: row.try_get("closing").map_err(unexpected)?,
        signature: row.try_get("signature").map_err(unexpected)?,
        bulk_category: row
            .try_get::<String, _>("bulk_category")
            .map_err(unexpected)?
            .parse()
            .map_err(|e: soma_core::domain::drafts::UnknownCategory| {
                DraftStoreError::UnexpectedError(e.to_string())
            })?,
        allow_send: row.try_get("allow_send").map_err(unexpected)?,
        dispatched_at: row.try_get("dispatched_at").map_err(unexpected)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        author_id: row.try_get("author_id").map_err(unexpected)?,
    })
}

#[async_trait::async_trait]
impl DraftStore for PostgresDraftStore {
    async fn add_draft(&self, draft: NewEmailDraft) -> Result<EmailDraft, DraftStoreError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO email_drafts
                (id, subject, body, closing, signature, bulk_category,
                 allow_send, dispatched_at, created_at, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, NULL, $7, $8)
            "#,
        )
        .bind(id)
        .bind(&draft.subject)
        .bind(&draft.body)
        .bind(&draft.closing)
        .bind(&draft.signature)
        .bind(draft.bulk_category.as_str())
        .bind(created_at)
        .bind(draft.author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?;

        Ok(EmailDraft {
            id,
            subject: draft.subject,
            body: draft.body,
            closing: draft.closing,
            signature: draft.signature,
            bulk_category: draft.bulk_category,
            allow_send: false,
            dispatched_at: None,
            created_at,
            author_id: draft.author_id,
        })
    }

    async fn get_draft(&self, id: Uuid) -> Result<EmailDraft, DraftStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, subject, body, closing, signature, bulk_category,
                   allow_send, dispatched_at, created_at, author_id
            FROM email_drafts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?
        .ok_or(DraftStoreError::NotFound)?;
        draft_from_row(&row)
    }

    async fn list_drafts(&self) -> Result<Vec<EmailDraft>, DraftStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, subject, body, closing, signature, bulk_category,
                   allow_send, dispatched_at, created_at, author_id
            FROM email_drafts
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?;
        rows.iter().map(draft_from_row).collect()
    }

    async fn update_draft(
        &self,
        id: Uuid,
        update: DraftUpdate,
    ) -> Result<EmailDraft, DraftStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE email_drafts
            SET subject = $2, body = $3, closing = $4, signature = $5, bulk_category = $6
            WHERE id = $1 AND dispatched_at IS NULL
            "#,
        )
        .bind(id)
        .bind(&update.subject)
        .bind(&update.body)
        .bind(&update.closing)
        .bind(&update.signature)
        .bind(update.bulk_category.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_dispatched(id).await);
        }
        self.get_draft(id).await
    }

    async fn delete_draft(&self, id: Uuid) -> Result<(), DraftStoreError> {
        let result =
            sqlx::query("DELETE FROM email_drafts WHERE id = $1 AND dispatched_at IS NULL")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(self.missing_or_dispatched(id).await);
        }
        Ok(())
    }

    async fn set_allowed(&self, id: Uuid, allowed: bool) -> Result<(), DraftStoreError> {
        let result = sqlx::query("UPDATE email_drafts SET allow_send = $2 WHERE id = $1")
            .bind(id)
            .bind(allowed)
            .execute(&self.pool)
            .await
            .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(DraftStoreError::NotFound);
        }
        Ok(())
    }

    async fn mark_dispatched(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DraftStoreError> {
        let result = sqlx::query(
            "UPDATE email_drafts SET dispatched_at = $2 WHERE id = $1 AND dispatched_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| DraftStoreError::UnexpectedError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(self.missing_or_dispatched(id).await);
        }
        Ok(())
    }
}
