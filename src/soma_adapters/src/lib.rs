pub mod config;
pub mod credentials;
pub mod email;
pub mod persistence;
pub mod verification;

pub use config::settings::Settings;
pub use email::{MockEmailClient, ReqwestEmailClient, SentEmail};
pub use persistence::{
    InMemoryAccountStore, InMemoryAttendanceStore, InMemoryDraftStore, InMemorySubscriberStore,
    PostgresAccountStore, PostgresAttendanceStore, PostgresDraftStore, PostgresSubscriberStore,
};
pub use verification::{MockVerificationClient, VerifyApiClient};
