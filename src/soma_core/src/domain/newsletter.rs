use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::email::EmailAddress;

/// A confirmed newsletter subscriber. Created only after the address owner
/// passes the verification-code challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: EmailAddress,
    pub subscription_status: bool,
    /// Drip counter. Observed semantics are boolean-like: every stage send
    /// targets subscribers still at zero and bumps them to one.
    pub newsletters_sent: i32,
    pub confirmed_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn is_active(&self) -> bool {
        self.subscription_status
    }
}

/// The three fixed steps of the drip campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsletterStage {
    First,
    Second,
    Third,
}

impl NewsletterStage {
    pub fn number(&self) -> u8 {
        match self {
            NewsletterStage::First => 1,
            NewsletterStage::Second => 2,
            NewsletterStage::Third => 3,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            NewsletterStage::First => "[somaSOMA] Welcome To Our Newsletter",
            NewsletterStage::Second => "[somaSOMA] Meet Our Programs",
            NewsletterStage::Third => "[somaSOMA] Join A Learning Group",
        }
    }
}

impl FromStr for NewsletterStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(NewsletterStage::First),
            "2" => Ok(NewsletterStage::Second),
            "3" => Ok(NewsletterStage::Third),
            other => Err(UnknownStage(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Unknown newsletter stage: {0}")]
pub struct UnknownStage(pub String);
