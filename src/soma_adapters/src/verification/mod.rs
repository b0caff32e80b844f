mod mock_verification_client;
mod verify_api_client;

pub use mock_verification_client::MockVerificationClient;
pub use verify_api_client::VerifyApiClient;
