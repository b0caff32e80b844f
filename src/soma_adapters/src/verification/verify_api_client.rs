use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use soma_core::{VerificationClient, VerificationOutcome};

/// One-time-code verification over a Twilio-Verify-compatible HTTP API.
/// The channel is picked from the destination shape: addresses containing
/// `@` go out by email, anything else by SMS.
pub struct VerifyApiClient {
    http_client: Client,
    base_url: String,
    account_sid: String,
    auth_token: Secret<String>,
    service_sid: String,
}

#[derive(serde::Deserialize)]
struct VerificationCheckResponse {
    status: String,
}

impl VerifyApiClient {
    pub fn new(
        base_url: String,
        account_sid: String,
        auth_token: Secret<String>,
        service_sid: String,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url,
            account_sid,
            auth_token,
            service_sid,
        }
    }

    fn channel_for(destination: &str) -> &'static str {
        if destination.contains('@') { "email" } else { "sms" }
    }
}

#[async_trait::async_trait]
impl VerificationClient for VerifyApiClient {
    #[tracing::instrument(name = "Requesting verification code", skip_all)]
    async fn request_code(&self, destination: &str) -> Result<(), String> {
        let url = format!(
            "{}/v2/Services/{}/Verifications",
            self.base_url, self.service_sid
        );

        self.http_client
            .post(url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("To", destination),
                ("Channel", Self::channel_for(destination)),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    // Any transport or decode failure reads as a denied code; callers never
    // see the underlying error.
    #[tracing::instrument(name = "Checking verification code", skip_all)]
    async fn check_code(&self, destination: &str, code: &str) -> VerificationOutcome {
        let url = format!(
            "{}/v2/Services/{}/VerificationCheck",
            self.base_url, self.service_sid
        );

        let response = self
            .http_client
            .post(url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", destination), ("Code", code)])
            .send()
            .await;

        let approved = match response {
            Ok(response) => response
                .json::<VerificationCheckResponse>()
                .await
                .map(|check| check.status == "approved")
                .unwrap_or(false),
            Err(_) => false,
        };

        if approved {
            VerificationOutcome::Approved
        } else {
            VerificationOutcome::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> VerifyApiClient {
        VerifyApiClient::new(
            base_url,
            "AC123".to_owned(),
            Secret::from("auth-token".to_owned()),
            "VA456".to_owned(),
            std::time::Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn email_destinations_use_the_email_channel() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/Services/VA456/Verifications"))
            .and(body_string_contains("Channel=email"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(mock_server.uri())
            .request_code("a@b.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn phone_destinations_use_the_sms_channel() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/Services/VA456/Verifications"))
            .and(body_string_contains("Channel=sms"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(mock_server.uri())
            .request_code("+254700111222")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn approved_status_is_approved() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/Services/VA456/VerificationCheck"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": "approved"
                })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(mock_server.uri())
            .check_code("a@b.com", "123456")
            .await;
        assert_eq!(outcome, VerificationOutcome::Approved);
    }

    #[tokio::test]
    async fn pending_status_is_denied() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/Services/VA456/VerificationCheck"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": "pending"
                })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(mock_server.uri())
            .check_code("a@b.com", "000000")
            .await;
        assert_eq!(outcome, VerificationOutcome::Denied);
    }

    #[tokio::test]
    async fn transport_failure_is_denied() {
        let outcome = client("http://127.0.0.1:9".to_owned())
            .check_code("a@b.com", "123456")
            .await;
        assert_eq!(outcome, VerificationOutcome::Denied);
    }
}
