use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const MAX_EMAIL_LENGTH: usize = 128;

/// A validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

#[derive(Debug, Error, PartialEq)]
pub enum EmailAddressError {
    #[error("Email address is not valid")]
    Invalid,
    #[error("Email address is too long")]
    TooLong,
}

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let candidate = value.trim().to_ascii_lowercase();
        if candidate.len() > MAX_EMAIL_LENGTH {
            return Err(EmailAddressError::TooLong);
        }
        if !EMAIL_RE.is_match(&candidate) {
            return Err(EmailAddressError::Invalid);
        }
        Ok(Self(candidate))
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_lowercases_valid_addresses() {
        let email = EmailAddress::try_from("JDoe@Example.COM").unwrap();
        assert_eq!(email.as_str(), "jdoe@example.com");
    }

    #[test]
    fn rejects_missing_at_sign() {
        assert_eq!(
            EmailAddress::try_from("not-an-email"),
            Err(EmailAddressError::Invalid)
        );
    }

    #[test]
    fn rejects_missing_domain_dot() {
        assert_eq!(
            EmailAddress::try_from("user@localhost"),
            Err(EmailAddressError::Invalid)
        );
    }

    #[test]
    fn rejects_overlong_addresses() {
        let local = "a".repeat(130);
        assert_eq!(
            EmailAddress::try_from(format!("{local}@example.com")),
            Err(EmailAddressError::TooLong)
        );
    }

    #[test]
    fn quickcheck_never_accepts_whitespace() {
        fn prop(s: String) -> bool {
            match EmailAddress::try_from(s) {
                Ok(email) => !email.as_str().contains(char::is_whitespace),
                Err(_) => true,
            }
        }
        quickcheck::quickcheck(prop as fn(String) -> bool);
    }
}
