use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("valid phone regex"));

/// An E.164 phone number, e.g. `+254700111222`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

#[derive(Debug, Error, PartialEq)]
pub enum PhoneNumberError {
    #[error("Invalid phone number")]
    Invalid,
}

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let candidate: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if !PHONE_RE.is_match(&candidate) {
            return Err(PhoneNumberError::Invalid);
        }
        Ok(Self(candidate))
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_e164_numbers() {
        assert!(PhoneNumber::try_from("+254700111222").is_ok());
    }

    #[test]
    fn strips_interior_whitespace() {
        let phone = PhoneNumber::try_from("+254 700 111 222").unwrap();
        assert_eq!(phone.as_str(), "+254700111222");
    }

    #[test]
    fn rejects_numbers_without_country_prefix() {
        assert_eq!(
            PhoneNumber::try_from("0700111222"),
            Err(PhoneNumberError::Invalid)
        );
    }

    #[test]
    fn rejects_letters() {
        assert_eq!(
            PhoneNumber::try_from("+2547001call"),
            Err(PhoneNumberError::Invalid)
        );
    }
}
