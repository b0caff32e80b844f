pub mod accounts;
pub mod drafts;
pub mod newsletter;
