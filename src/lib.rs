//! # Soma - School Service Library
//!
//! This is a facade crate that re-exports all public APIs from the school
//! service components. Use this crate to get access to the whole service in
//! one place.
//!
//! ## Structure
//!
//! - **Core domain types**: `Account`, `EmailAddress`, `Password`, `Subscriber`, etc.
//! - **Repository traits**: `AccountStore`, `AttendanceStore`, `SubscriberStore`, `DraftStore`
//! - **Use cases**: `RegisterAccountUseCase`, `LoginUseCase`, `DispatchDraftUseCase`, etc.
//! - **Adapters**: `PostgresAccountStore`, `ReqwestEmailClient`, `VerifyApiClient`, etc.
//! - **Service**: `SchoolService` - the main entry point

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use soma_core::*;
}

// Re-export most commonly used core types at the root level
pub use soma_core::{
    Account, AttendanceRecord, BulkCategory, EmailAddress, EmailDraft, NewsletterStage, Password,
    PhoneNumber, RegistrationRequest, Role, RoleDetails, Subscriber, Username,
};

// ============================================================================
// Repository Traits (Ports)
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use soma_core::{
        AccountStore, AccountStoreError, AttendanceStore, AttendanceStoreError, DraftStore,
        DraftStoreError, SubscriberStore, SubscriberStoreError, UnsubscribeOutcome,
    };
}

// Re-export repository traits at root level
pub use soma_core::{
    AccountStore, AccountStoreError, AttendanceStore, AttendanceStoreError, DraftStore,
    DraftStoreError, EmailClient, SubscriberStore, SubscriberStoreError, VerificationClient,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use soma_application::*;
}

// Re-export use cases at root level
pub use soma_application::{
    AdvanceNewsletterStageUseCase, ConfirmSubscriptionUseCase, DispatchDraftUseCase,
    DraftEmailUseCase, LoginUseCase, RegisterAccountUseCase, RequestPasswordResetUseCase,
    ResetPasswordUseCase, SubscribeUseCase, VerifyLoginUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use soma_adapters::persistence::*;
    }

    /// Email client implementations
    pub mod email {
        pub use soma_adapters::email::*;
    }

    /// Verification client implementations
    pub mod verification {
        pub use soma_adapters::verification::*;
    }

    /// Configuration
    pub mod config {
        pub use soma_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use soma_adapters::{
    InMemoryAccountStore, InMemoryAttendanceStore, InMemoryDraftStore, InMemorySubscriberStore,
    MockEmailClient, MockVerificationClient, PostgresAccountStore, PostgresAttendanceStore,
    PostgresDraftStore, PostgresSubscriberStore, ReqwestEmailClient, Settings, VerifyApiClient,
};

// ============================================================================
// HTTP Layer
// ============================================================================

/// Axum router and shared handler state
pub use soma_axum::{AppState, router};

// ============================================================================
// School Service (Main Entry Point)
// ============================================================================

/// Main school service
pub use soma_school_service::{SchoolService, build_state, configure_postgresql};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing repository traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
