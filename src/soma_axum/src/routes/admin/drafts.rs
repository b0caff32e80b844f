//! Admin email drafting. A draft is composed, optionally edited, explicitly
//! cleared for sending, and then dispatched either to its bulk category or
//! to a single named recipient. Dispatch is once only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use soma_application::{
    AllowDraftError, AllowDraftUseCase, DeleteDraftError, DeleteDraftUseCase, DispatchDraftError,
    DispatchDraftUseCase, DraftEmailError, DraftEmailUseCase, UpdateDraftError, UpdateDraftUseCase,
};
use soma_core::{BulkCategory, DraftUpdate, EmailAddress, EmailDraft, NewEmailDraft};
use thiserror::Error;
use uuid::Uuid;

use crate::cookies::flash;
use crate::extract::AdminSession;
use crate::routes::UnexpectedError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DraftForm {
    pub subject: String,
    pub body: String,
    pub closing: String,
    pub signature: String,
    pub bulk_category: BulkCategory,
}

#[derive(Debug, Deserialize)]
pub struct DispatchForm {
    /// When present, dispatch to this single address instead of the draft's
    /// bulk category.
    pub recipient: Option<String>,
}

#[tracing::instrument(name = "CreateDraft", skip_all, fields(author_id = %admin.0.account_id))]
pub async fn create_draft(
    admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<DraftForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let draft = NewEmailDraft {
        subject: form.subject,
        body: form.body,
        closing: form.closing,
        signature: form.signature,
        bulk_category: form.bulk_category,
        author_id: admin.0.account_id,
    };

    DraftEmailUseCase::new(state.draft_store.as_ref())
        .execute(draft)
        .await
        .map_err(|DraftEmailError::UnexpectedError(e)| UnexpectedError(e))?;

    Ok((flash(jar, "Draft saved"), Redirect::to("/admin/emails")))
}

#[tracing::instrument(name = "ListDrafts", skip_all)]
pub async fn list_drafts(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<EmailDraft>>, UnexpectedError> {
    let drafts = state
        .draft_store
        .list_drafts()
        .await
        .map_err(|e| UnexpectedError(e.to_string()))?;

    Ok(Json(drafts))
}

#[derive(Debug, Error)]
pub enum GetDraftError {
    #[error("Draft not found")]
    NotFound,
    #[error(transparent)]
    Unexpected(#[from] UnexpectedError),
}

impl IntoResponse for GetDraftError {
    fn into_response(self) -> Response {
        match self {
            GetDraftError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "Draft not found" })),
            )
                .into_response(),
            GetDraftError::Unexpected(e) => e.into_response(),
        }
    }
}

#[tracing::instrument(name = "GetDraft", skip_all, fields(draft_id = %id))]
pub async fn get_draft(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmailDraft>, GetDraftError> {
    use soma_core::DraftStoreError;

    let draft = state.draft_store.get_draft(id).await.map_err(|e| match e {
        DraftStoreError::NotFound => GetDraftError::NotFound,
        other => UnexpectedError(other.to_string()).into(),
    })?;

    Ok(Json(draft))
}

#[tracing::instrument(name = "UpdateDraft", skip_all, fields(draft_id = %id))]
pub async fn update_draft(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(form): Form<DraftForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let update = DraftUpdate {
        subject: form.subject,
        body: form.body,
        closing: form.closing,
        signature: form.signature,
        bulk_category: form.bulk_category,
    };

    let back = format!("/admin/emails/{id}");
    let use_case = UpdateDraftUseCase::new(state.draft_store.as_ref());

    match use_case.execute(id, update).await {
        Ok(_) => Ok((flash(jar, "Draft updated"), Redirect::to(&back))),
        Err(UpdateDraftError::NotFound) => Ok((
            flash(jar, "Draft not found"),
            Redirect::to("/admin/emails"),
        )),
        Err(UpdateDraftError::AlreadyDispatched) => Ok((
            flash(jar, "Draft has already been dispatched and cannot change"),
            Redirect::to(&back),
        )),
        Err(UpdateDraftError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "DeleteDraft", skip_all, fields(draft_id = %id))]
pub async fn delete_draft(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let use_case = DeleteDraftUseCase::new(state.draft_store.as_ref());

    match use_case.execute(id).await {
        Ok(()) => Ok((flash(jar, "Draft deleted"), Redirect::to("/admin/emails"))),
        Err(DeleteDraftError::NotFound) => Ok((
            flash(jar, "Draft not found"),
            Redirect::to("/admin/emails"),
        )),
        Err(DeleteDraftError::AlreadyDispatched) => Ok((
            flash(jar, "Dispatched drafts are kept for the record"),
            Redirect::to("/admin/emails"),
        )),
        Err(DeleteDraftError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "AllowDraft", skip_all, fields(draft_id = %id))]
pub async fn allow_draft(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let use_case = AllowDraftUseCase::new(state.draft_store.as_ref());

    match use_case.execute(id, true).await {
        Ok(()) => Ok((
            flash(jar, "Draft cleared for sending"),
            Redirect::to(&format!("/admin/emails/{id}")),
        )),
        Err(AllowDraftError::NotFound) => Ok((
            flash(jar, "Draft not found"),
            Redirect::to("/admin/emails"),
        )),
        Err(AllowDraftError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "DispatchDraft", skip_all, fields(draft_id = %id))]
pub async fn dispatch_draft(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(form): Form<DispatchForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let back = format!("/admin/emails/{id}");

    let use_case = DispatchDraftUseCase::new(
        state.draft_store.as_ref(),
        state.account_store.as_ref(),
        state.subscriber_store.as_ref(),
        state.email_client.as_ref(),
    );

    let outcome = match form.recipient {
        Some(raw) => {
            let Ok(recipient) = EmailAddress::try_from(raw) else {
                return Ok((
                    flash(jar, "recipient: please enter a valid email address"),
                    Redirect::to(&back),
                ));
            };
            use_case
                .execute_individual(id, &recipient)
                .await
                .map(|()| "Draft dispatched to 1 recipient".to_owned())
        }
        None => use_case
            .execute(id)
            .await
            .map(|count| format!("Draft dispatched to {count} recipients")),
    };

    match outcome {
        Ok(message) => Ok((flash(jar, message), Redirect::to(&back))),
        Err(DispatchDraftError::NotFound) => Ok((
            flash(jar, "Draft not found"),
            Redirect::to("/admin/emails"),
        )),
        Err(DispatchDraftError::NotAllowed) => Ok((
            flash(jar, "Draft must be cleared for sending first"),
            Redirect::to(&back),
        )),
        Err(DispatchDraftError::AlreadyDispatched) => Ok((
            flash(jar, "Draft has already been dispatched"),
            Redirect::to(&back),
        )),
        Err(DispatchDraftError::NoRecipients) => Ok((
            flash(jar, "No recipients in the selected category"),
            Redirect::to(&back),
        )),
        Err(DispatchDraftError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
