use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use soma_application::{RequestAccountDeletionError, RequestAccountDeletionUseCase};

use crate::cookies::flash;
use crate::extract::Session;
use crate::routes::UnexpectedError;
use crate::state::AppState;

/// Flag the signed-in account for deletion. The account stays usable until
/// an admin carries the deletion out.
#[tracing::instrument(name = "RequestAccountDeletion", skip_all, fields(account_id = %session.account_id))]
pub async fn request_deletion(
    session: Session,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let use_case = RequestAccountDeletionUseCase::new(state.account_store.as_ref());

    match use_case.execute(session.account_id).await {
        Ok(()) => Ok((
            flash(jar, "Deletion request received. An admin will follow up."),
            Redirect::to("/"),
        )),
        Err(RequestAccountDeletionError::NotFound) => Ok((
            flash(jar, "Account not found"),
            Redirect::to("/login"),
        )),
        Err(RequestAccountDeletionError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}
