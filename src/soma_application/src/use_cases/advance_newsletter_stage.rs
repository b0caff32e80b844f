use soma_core::{EmailClient, NewsletterStage, SubscriberStore};
use thiserror::Error;

use crate::templates;

#[derive(Debug, Error)]
pub enum AdvanceNewsletterStageError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDispatchReport {
    pub attempted: usize,
    pub delivered: usize,
}

/// Sends one drip stage to every active subscriber whose counter is still
/// zero, bumping each counter to one afterwards.
///
/// The zero-counter gate means a subscriber only ever receives the first
/// stage that runs after they confirm; later stages skip them. A failed
/// send is also marked, so the ledger never retries an address.
pub struct AdvanceNewsletterStageUseCase<'a, S, E>
where
    S: SubscriberStore + ?Sized,
    E: EmailClient + ?Sized,
{
    subscriber_store: &'a S,
    email_client: &'a E,
}

impl<'a, S, E> AdvanceNewsletterStageUseCase<'a, S, E>
where
    S: SubscriberStore + ?Sized,
    E: EmailClient + ?Sized,
{
    pub fn new(subscriber_store: &'a S, email_client: &'a E) -> Self {
        Self {
            subscriber_store,
            email_client,
        }
    }

    #[tracing::instrument(
        name = "AdvanceNewsletterStageUseCase::execute",
        skip_all,
        fields(stage = stage.number())
    )]
    pub async fn execute(
        &self,
        stage: NewsletterStage,
    ) -> Result<StageDispatchReport, AdvanceNewsletterStageError> {
        let unsent = self
            .subscriber_store
            .unsent_subscribers()
            .await
            .map_err(|e| AdvanceNewsletterStageError::UnexpectedError(e.to_string()))?;

        let (text, html) = templates::render_newsletter_stage(stage)
            .map_err(AdvanceNewsletterStageError::UnexpectedError)?;

        let mut delivered = 0;
        for subscriber in &unsent {
            match self
                .email_client
                .send_email(&[subscriber.email.clone()], stage.subject(), &text, &html)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(email = %subscriber.email, "Failed to send newsletter: {e}");
                }
            }
            self.subscriber_store
                .mark_sent(&subscriber.email)
                .await
                .map_err(|e| AdvanceNewsletterStageError::UnexpectedError(e.to_string()))?;
        }

        Ok(StageDispatchReport {
            attempted: unsent.len(),
            delivered,
        })
    }
}
