//! Shared fixtures for use-case tests, built on the in-memory adapters.

use secrecy::Secret;
use soma_core::{NewAccount, RegistrationRequest, RoleFields};

pub(crate) fn parent_registration(username: &str, email: &str) -> NewAccount {
    RegistrationRequest {
        first_name: "Jane".to_owned(),
        last_name: "Doe".to_owned(),
        username: username.to_owned(),
        email: email.to_owned(),
        phone_number: "+254700111222".to_owned(),
        password: Secret::from("somaSOMA123".to_owned()),
        confirm_password: Secret::from("somaSOMA123".to_owned()),
        role_fields: RoleFields::Parent {
            residence: "Roselyn, Nairobi".to_owned(),
        },
    }
    .validate()
    .expect("valid registration")
}

pub(crate) const TEST_SIGNING_KEY: &[u8] = b"test-signing-key";
