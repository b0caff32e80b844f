use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 20;

/// A validated plaintext password, held only long enough to hash or verify.
///
/// Rules follow the registration form: 8 to 20 characters, letters and
/// digits only, with at least one of each.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

#[derive(Debug, Error, PartialEq)]
pub enum PasswordError {
    #[error("Password must be between 8 and 20 characters long")]
    InvalidLength,
    #[error("Password must contain at least one letter and one number")]
    MissingLetterOrDigit,
    #[error("Password may only contain letters and numbers")]
    InvalidCharacter,
}

impl Password {
    pub fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        let raw = value.expose_secret();
        if raw.len() < MIN_PASSWORD_LENGTH || raw.len() > MAX_PASSWORD_LENGTH {
            return Err(PasswordError::InvalidLength);
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PasswordError::InvalidCharacter);
        }
        let has_letter = raw.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = raw.chars().any(|c| c.is_ascii_digit());
        if !has_letter || !has_digit {
            return Err(PasswordError::MissingLetterOrDigit);
        }
        Ok(Self(value))
    }
}

impl TryFrom<String> for Password {
    type Error = PasswordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(Secret::from(value))
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mixed_letters_and_digits() {
        assert!(Password::try_from("somaSOMA123".to_owned()).is_ok());
    }

    #[test]
    fn rejects_short_passwords() {
        assert_eq!(
            Password::try_from("abc123".to_owned()),
            Err(PasswordError::InvalidLength)
        );
    }

    #[test]
    fn rejects_passwords_over_twenty_characters() {
        assert_eq!(
            Password::try_from("abcdefghij1234567890x".to_owned()),
            Err(PasswordError::InvalidLength)
        );
    }

    #[test]
    fn rejects_letters_only() {
        assert_eq!(
            Password::try_from("abcdefgh".to_owned()),
            Err(PasswordError::MissingLetterOrDigit)
        );
    }

    #[test]
    fn rejects_digits_only() {
        assert_eq!(
            Password::try_from("12345678".to_owned()),
            Err(PasswordError::MissingLetterOrDigit)
        );
    }

    #[test]
    fn rejects_symbols() {
        assert_eq!(
            Password::try_from("abcd123!".to_owned()),
            Err(PasswordError::InvalidCharacter)
        );
    }

    #[test]
    fn debug_output_does_not_leak_the_secret() {
        let password = Password::try_from("somaSOMA123".to_owned()).unwrap();
        let rendered = format!("{password:?}");
        assert!(!rendered.contains("somaSOMA123"));
    }
}
