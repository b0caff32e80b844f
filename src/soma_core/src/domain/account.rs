use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{email::EmailAddress, password::Password, phone::PhoneNumber, username::Username};

pub const MIN_STUDENT_AGE: u8 = 6;
pub const MAX_STUDENT_AGE: u8 = 17;

/// Role discriminator. Immutable once an account has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Role-specific payload. One variant per role, selected by the
/// discriminator; the shared identity fields live on [`Account`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleDetails {
    Parent {
        residence: String,
    },
    Student {
        age: u8,
        school: String,
        coding_experience: String,
        program: String,
        program_schedule: String,
        cohort: i32,
        /// Owning parent; `None` for legacy or unlinked students.
        parent_id: Option<Uuid>,
    },
    Teacher {
        course: String,
        residence: String,
    },
    Admin {
        residence: String,
        department: String,
    },
}

impl RoleDetails {
    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Parent { .. } => Role::Parent,
            RoleDetails::Student { .. } => Role::Student,
            RoleDetails::Teacher { .. } => Role::Teacher,
            RoleDetails::Admin { .. } => Role::Admin,
        }
    }
}

/// A stored account: base identity plus the role payload. The password
/// credential never leaves the store that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: Username,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    /// Presence indicates two-factor enrollment.
    pub verification_phone: Option<PhoneNumber>,
    pub active: bool,
    pub pending_deletion: bool,
    pub registered_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: RoleDetails,
}

impl Account {
    pub fn role(&self) -> Role {
        self.details.role()
    }

    pub fn two_factor_enabled(&self) -> bool {
        self.verification_phone.is_some()
    }
}

/// A fully validated account waiting to be persisted. Carries the plaintext
/// password; the store hashes it on insert.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: Username,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub verification_phone: Option<PhoneNumber>,
    pub password: Password,
    pub details: RoleDetails,
}

impl NewAccount {
    pub fn role(&self) -> Role {
        self.details.role()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Parent, Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("boss".parse::<Role>().is_err());
    }

    #[test]
    fn details_report_their_role() {
        let details = RoleDetails::Teacher {
            course: "Python".to_owned(),
            residence: "Roselyn, Nairobi".to_owned(),
        };
        assert_eq!(details.role(), Role::Teacher);
    }
}
