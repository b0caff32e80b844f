use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_USERNAME_LENGTH: usize = 64;

/// A validated login handle, unique across all roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

#[derive(Debug, Error, PartialEq)]
pub enum UsernameError {
    #[error("Username must be between 1 and 64 characters long")]
    InvalidLength,
    #[error("Username may not contain whitespace")]
    ContainsWhitespace,
}

impl Username {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let candidate = value.trim().to_owned();
        if candidate.is_empty() || candidate.len() > MAX_USERNAME_LENGTH {
            return Err(UsernameError::InvalidLength);
        }
        if candidate.contains(char::is_whitespace) {
            return Err(UsernameError::ContainsWhitespace);
        }
        Ok(Self(candidate))
    }
}

impl TryFrom<&str> for Username {
    type Error = UsernameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(Username::try_from("  jdoe ").unwrap().as_str(), "jdoe");
    }

    #[test]
    fn rejects_empty_usernames() {
        assert_eq!(Username::try_from(""), Err(UsernameError::InvalidLength));
    }

    #[test]
    fn rejects_inner_whitespace() {
        assert_eq!(
            Username::try_from("j doe"),
            Err(UsernameError::ContainsWhitespace)
        );
    }
}
