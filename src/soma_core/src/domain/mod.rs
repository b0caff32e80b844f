pub mod account;
pub mod attendance;
pub mod drafts;
pub mod email;
pub mod newsletter;
pub mod password;
pub mod phone;
pub mod registration;
pub mod username;
