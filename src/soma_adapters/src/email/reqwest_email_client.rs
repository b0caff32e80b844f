use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use soma_core::{EmailAddress, EmailClient};

/// Postmark-compatible HTTP email client. Sends are fire-and-forget from the
/// caller's point of view; a non-2xx response surfaces as the error string.
pub struct ReqwestEmailClient {
    http_client: Client,
    base_url: String,
    sender: EmailAddress,
    authorization_token: Secret<String>,
}

impl ReqwestEmailClient {
    pub fn new(
        base_url: String,
        sender: EmailAddress,
        authorization_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: String,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

#[async_trait::async_trait]
impl EmailClient for ReqwestEmailClient {
    #[tracing::instrument(name = "Sending email", skip_all, fields(subject = %subject))]
    async fn send_email(
        &self,
        recipients: &[EmailAddress],
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), String> {
        let base = Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        let url = base.join("/email").map_err(|e| e.to_string())?;

        let request_body = SendEmailRequest {
            from: self.sender.as_str(),
            to: recipients
                .iter()
                .map(EmailAddress::as_str)
                .collect::<Vec<_>>()
                .join(","),
            subject,
            html_body,
            text_body,
        };

        self.http_client
            .post(url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}
