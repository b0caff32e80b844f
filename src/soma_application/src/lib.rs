pub mod templates;
pub mod tokens;
pub mod use_cases;

pub use use_cases::{
    advance_newsletter_stage::{AdvanceNewsletterStageError, AdvanceNewsletterStageUseCase, StageDispatchReport},
    allow_draft::{AllowDraftError, AllowDraftUseCase},
    confirm_subscription::{ConfirmSubscriptionError, ConfirmSubscriptionUseCase},
    delete_account::{DeleteAccountError, DeleteAccountUseCase},
    delete_draft::{DeleteDraftError, DeleteDraftUseCase},
    delete_subscriber::{DeleteSubscriberError, DeleteSubscriberUseCase},
    dispatch_draft::{DispatchDraftError, DispatchDraftUseCase},
    draft_email::{DraftEmailError, DraftEmailUseCase},
    list_attendance::{ListAttendanceError, ListAttendanceUseCase},
    login::{LoginError, LoginOutcome, LoginUseCase},
    record_attendance::{RecordAttendanceError, RecordAttendanceUseCase},
    register_account::{RegisterAccountError, RegisterAccountUseCase},
    request_account_deletion::{RequestAccountDeletionError, RequestAccountDeletionUseCase},
    request_password_reset::{RequestPasswordResetError, RequestPasswordResetUseCase},
    reset_password::{ResetPasswordError, ResetPasswordUseCase},
    resubscribe::{ResubscribeError, ResubscribeUseCase},
    set_account_active::{SetAccountActiveError, SetAccountActiveUseCase},
    subscribe::{SubscribeError, SubscribeUseCase},
    unsubscribe::{UnsubscribeError, UnsubscribeUseCase},
    update_draft::{UpdateDraftError, UpdateDraftUseCase},
    verify_login::{VerifyLoginError, VerifyLoginUseCase},
};
