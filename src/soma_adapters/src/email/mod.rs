mod mock_email_client;
mod reqwest_email_client;

pub use mock_email_client::{MockEmailClient, SentEmail};
pub use reqwest_email_client::ReqwestEmailClient;
