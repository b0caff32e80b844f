//! Layered configuration: `config/base` plus an environment-specific file
//! (`config/local`, `config/production`), overridable through `SOMA__`
//! environment variables with `__` as the section separator.

use std::time::Duration;

use secrecy::Secret;
use serde::Deserialize;
use soma_core::{EmailAddress, EmailAddressError};

use super::constants::env::ENVIRONMENT_ENV_VAR;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub postgres: PostgresSettings,
    pub auth: AuthSettings,
    pub email_client: EmailClientSettings,
    pub verification: VerificationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public origin used when building links in outbound email.
    pub base_url: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub signing_key: Secret<String>,
    pub session_ttl_seconds: i64,
    pub reset_ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub authorization_token: Secret<String>,
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<EmailAddress, EmailAddressError> {
        EmailAddress::try_from(self.sender.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationSettings {
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: Secret<String>,
    pub service_sid: String,
    pub timeout_milliseconds: u64,
}

impl VerificationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        let environment =
            std::env::var(ENVIRONMENT_ENV_VAR).unwrap_or_else(|_| "local".to_owned());

        config::Config::builder()
            .add_source(config::File::with_name("config/base").required(false))
            .add_source(
                config::File::with_name(&format!("config/{environment}")).required(false),
            )
            .add_source(config::Environment::with_prefix("SOMA").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_settings_format_a_socket_address() {
        let settings = ApplicationSettings {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_owned(),
        };
        assert_eq!(settings.address(), "127.0.0.1:3000");
    }

    #[test]
    fn email_sender_must_be_a_valid_address() {
        let settings = EmailClientSettings {
            base_url: "https://api.postmarkapp.com/".to_owned(),
            sender: "not-an-address".to_owned(),
            authorization_token: Secret::from("token".to_owned()),
            timeout_milliseconds: 200,
        };
        assert!(settings.sender().is_err());
    }
}
