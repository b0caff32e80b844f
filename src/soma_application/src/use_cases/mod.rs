pub mod advance_newsletter_stage;
pub mod allow_draft;
pub mod confirm_subscription;
pub mod delete_account;
pub mod delete_draft;
pub mod delete_subscriber;
pub mod dispatch_draft;
pub mod draft_email;
pub mod list_attendance;
pub mod login;
pub mod record_attendance;
pub mod register_account;
pub mod request_account_deletion;
pub mod request_password_reset;
pub mod reset_password;
pub mod resubscribe;
pub mod set_account_active;
pub mod subscribe;
pub mod unsubscribe;
pub mod update_draft;
pub mod verify_login;

#[cfg(test)]
pub(crate) mod test_support;
