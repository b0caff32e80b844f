pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{Account, NewAccount, Role, RoleDetails},
    attendance::{AttendanceRecord, NewAttendanceRecord},
    drafts::{BulkCategory, DraftUpdate, EmailDraft, NewEmailDraft},
    email::{EmailAddress, EmailAddressError},
    newsletter::{NewsletterStage, Subscriber},
    password::{Password, PasswordError},
    phone::{PhoneNumber, PhoneNumberError},
    registration::{FieldError, RegistrationRequest, RoleFields},
    username::{Username, UsernameError},
};

pub use ports::{
    repositories::{
        AccountStore, AccountStoreError, AttendanceStore, AttendanceStoreError, DraftStore,
        DraftStoreError, SubscriberStore, SubscriberStoreError, UnsubscribeOutcome,
    },
    services::{EmailClient, VerificationClient, VerificationOutcome},
};
