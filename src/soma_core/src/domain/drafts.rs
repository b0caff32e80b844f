use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience a drafted message targets when dispatched in bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkCategory {
    Parents,
    Students,
    Teachers,
    Admins,
    Subscribers,
}

impl BulkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkCategory::Parents => "parents",
            BulkCategory::Students => "students",
            BulkCategory::Teachers => "teachers",
            BulkCategory::Admins => "admins",
            BulkCategory::Subscribers => "subscribers",
        }
    }
}

impl fmt::Display for BulkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parents" => Ok(BulkCategory::Parents),
            "students" => Ok(BulkCategory::Students),
            "teachers" => Ok(BulkCategory::Teachers),
            "admins" => Ok(BulkCategory::Admins),
            "subscribers" => Ok(BulkCategory::Subscribers),
            other => Err(UnknownCategory(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Unknown bulk category: {0}")]
pub struct UnknownCategory(pub String);

/// A drafted outbound message. Drafting and dispatching are separate steps:
/// a draft must be marked allowed before it can be dispatched, and it is
/// dispatched at most once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDraft {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub closing: String,
    pub signature: String,
    pub bulk_category: BulkCategory,
    pub allow_send: bool,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
}

impl EmailDraft {
    pub fn dispatched(&self) -> bool {
        self.dispatched_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewEmailDraft {
    pub subject: String,
    pub body: String,
    pub closing: String,
    pub signature: String,
    pub bulk_category: BulkCategory,
    pub author_id: Uuid,
}

/// Replacement content for an existing, not-yet-dispatched draft.
#[derive(Debug, Clone)]
pub struct DraftUpdate {
    pub subject: String,
    pub body: String,
    pub closing: String,
    pub signature: String,
    pub bulk_category: BulkCategory,
}
