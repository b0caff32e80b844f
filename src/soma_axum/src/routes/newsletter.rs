//! Newsletter signup and lifecycle routes. The address under verification
//! never appears in the confirm form; it rides in a signed, short-lived
//! cookie issued at signup.

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use soma_application::tokens;
use soma_application::{
    ConfirmSubscriptionError, ConfirmSubscriptionUseCase, ResubscribeError, ResubscribeUseCase,
    SubscribeError, SubscribeUseCase, UnsubscribeError, UnsubscribeUseCase,
};
use soma_core::{EmailAddress, UnsubscribeOutcome};

use crate::cookies::{
    PENDING_SUBSCRIBER_COOKIE_NAME, flash, pending_subscriber_cookie, removal,
};
use crate::routes::UnexpectedError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailForm {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    pub code: String,
}

fn bad_email(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        flash(jar, "Please enter a valid email address"),
        Redirect::to("/newsletter"),
    )
}

#[tracing::instrument(name = "NewsletterSubscribe", skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<EmailForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Ok(email) = EmailAddress::try_from(form.email) else {
        return Ok(bad_email(jar));
    };

    let use_case = SubscribeUseCase::new(
        state.subscriber_store.as_ref(),
        state.verification_client.as_ref(),
    );

    match use_case.execute(&email).await {
        Ok(()) => {
            let token =
                tokens::issue_pending_subscriber_token(&email, state.signing_key_bytes())
                    .map_err(|e| UnexpectedError(e.to_string()))?;

            Ok((
                flash(
                    jar.add(pending_subscriber_cookie(token)),
                    "We sent a code to your inbox. Enter it below to confirm.",
                ),
                Redirect::to("/newsletter/confirm"),
            ))
        }
        Err(SubscribeError::AlreadySubscribed) => Ok((
            flash(jar, "That address is already subscribed"),
            Redirect::to("/newsletter"),
        )),
        Err(SubscribeError::PreviouslyUnsubscribed) => Ok((
            flash(
                jar,
                "That address unsubscribed earlier. Use resubscribe to opt back in.",
            ),
            Redirect::to("/newsletter"),
        )),
        Err(SubscribeError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "NewsletterConfirm", skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ConfirmForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Some(email) = jar.get(PENDING_SUBSCRIBER_COOKIE_NAME).and_then(|cookie| {
        tokens::verify_pending_subscriber_token(cookie.value(), state.signing_key_bytes())
    }) else {
        return Ok((
            flash(jar, "Verification window expired. Please subscribe again."),
            Redirect::to("/newsletter"),
        ));
    };

    let use_case = ConfirmSubscriptionUseCase::new(
        state.subscriber_store.as_ref(),
        state.verification_client.as_ref(),
        state.email_client.as_ref(),
    );

    match use_case.execute(&email, &form.code).await {
        Ok(_) => Ok((
            flash(
                jar.remove(removal(PENDING_SUBSCRIBER_COOKIE_NAME)),
                "Subscription confirmed. Welcome aboard!",
            ),
            Redirect::to("/"),
        )),
        Err(ConfirmSubscriptionError::CodeDenied) => Ok((
            flash(jar, "That code was not accepted"),
            Redirect::to("/newsletter/confirm"),
        )),
        Err(ConfirmSubscriptionError::AlreadySubscribed) => Ok((
            flash(
                jar.remove(removal(PENDING_SUBSCRIBER_COOKIE_NAME)),
                "That address is already subscribed",
            ),
            Redirect::to("/"),
        )),
        Err(ConfirmSubscriptionError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "NewsletterUnsubscribe", skip_all)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<EmailForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Ok(email) = EmailAddress::try_from(form.email) else {
        return Ok(bad_email(jar));
    };

    let use_case = UnsubscribeUseCase::new(state.subscriber_store.as_ref());

    match use_case.execute(&email).await {
        Ok(UnsubscribeOutcome::Unsubscribed) => Ok((
            flash(jar, "You have been unsubscribed"),
            Redirect::to("/"),
        )),
        Ok(UnsubscribeOutcome::AlreadyUnsubscribed) => Ok((
            flash(jar, "That address was already unsubscribed"),
            Redirect::to("/"),
        )),
        Err(UnsubscribeError::NotFound) => Ok((
            flash(jar, "That address is not on the newsletter"),
            Redirect::to("/"),
        )),
        Err(UnsubscribeError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "NewsletterResubscribe", skip_all)]
pub async fn resubscribe(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<EmailForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Ok(email) = EmailAddress::try_from(form.email) else {
        return Ok(bad_email(jar));
    };

    let use_case = ResubscribeUseCase::new(state.subscriber_store.as_ref());

    match use_case.execute(&email).await {
        Ok(()) => Ok((
            flash(jar, "Welcome back to the newsletter"),
            Redirect::to("/"),
        )),
        Err(ResubscribeError::NotFound) => Ok((
            flash(jar, "That address is not on the newsletter"),
            Redirect::to("/"),
        )),
        Err(ResubscribeError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
