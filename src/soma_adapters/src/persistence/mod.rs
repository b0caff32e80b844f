pub mod memory;
pub mod postgres;

pub use memory::{
    InMemoryAccountStore, InMemoryAttendanceStore, InMemoryDraftStore, InMemorySubscriberStore,
};
pub use postgres::{
    PostgresAccountStore, PostgresAttendanceStore, PostgresDraftStore, PostgresSubscriberStore,
};
