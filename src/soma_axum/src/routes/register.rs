//! Registration routes, one per role. Parent registration is self-service;
//! students are registered by their parent (or an admin), teachers and
//! admins only by an admin.

use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use secrecy::Secret;
use serde::Deserialize;
use soma_application::{RegisterAccountError, RegisterAccountUseCase};
use soma_core::{FieldError, RegistrationRequest, Role, RoleFields};
use uuid::Uuid;

use crate::cookies::flash;
use crate::extract::{AdminSession, AuthRejection, Session};
use crate::routes::UnexpectedError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PersonForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: Secret<String>,
    pub confirm_password: Secret<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParentForm {
    #[serde(flatten)]
    pub person: PersonForm,
    pub residence: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentForm {
    #[serde(flatten)]
    pub person: PersonForm,
    pub age: String,
    pub school: String,
    pub coding_experience: String,
    pub program: String,
    pub program_schedule: String,
    pub cohort: String,
    /// Only honored for admin callers; parents always register their own.
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TeacherForm {
    #[serde(flatten)]
    pub person: PersonForm,
    pub course: String,
    pub residence: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminForm {
    #[serde(flatten)]
    pub person: PersonForm,
    pub residence: String,
    pub department: String,
}

fn registration_request(person: PersonForm, role_fields: RoleFields) -> RegistrationRequest {
    RegistrationRequest {
        first_name: person.first_name,
        last_name: person.last_name,
        username: person.username,
        email: person.email,
        phone_number: person.phone_number,
        password: person.password,
        confirm_password: person.confirm_password,
        role_fields,
    }
}

fn field_errors_message(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

async fn register(
    state: &AppState,
    jar: CookieJar,
    request: RegistrationRequest,
    form_path: &str,
    success: (&str, &str),
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let use_case = RegisterAccountUseCase::new(state.account_store.as_ref());

    match use_case.execute(request).await {
        Ok(_) => Ok((flash(jar, success.1), Redirect::to(success.0))),
        Err(RegisterAccountError::Validation(errors)) => Ok((
            flash(jar, field_errors_message(&errors)),
            Redirect::to(form_path),
        )),
        Err(RegisterAccountError::DuplicateIdentity) => Ok((
            flash(jar, "Username or email already in use"),
            Redirect::to(form_path),
        )),
        Err(RegisterAccountError::UnexpectedError(e)) => Err(UnexpectedError(e)),
    }
}

#[tracing::instrument(name = "RegisterParent", skip_all)]
pub async fn register_parent(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ParentForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let ParentForm { person, residence } = form;
    let request = registration_request(person, RoleFields::Parent { residence });
    register(
        &state,
        jar,
        request,
        "/register/parent",
        ("/login", "Registration successful. Please log in."),
    )
    .await
}

#[derive(Debug)]
pub enum RegisterStudentError {
    Auth(AuthRejection),
    Unexpected(UnexpectedError),
}

impl From<AuthRejection> for RegisterStudentError {
    fn from(rejection: AuthRejection) -> Self {
        RegisterStudentError::Auth(rejection)
    }
}

impl From<UnexpectedError> for RegisterStudentError {
    fn from(e: UnexpectedError) -> Self {
        RegisterStudentError::Unexpected(e)
    }
}

impl IntoResponse for RegisterStudentError {
    fn into_response(self) -> Response {
        match self {
            RegisterStudentError::Auth(rejection) => rejection.into_response(),
            RegisterStudentError::Unexpected(e) => e.into_response(),
        }
    }
}

#[tracing::instrument(name = "RegisterStudent", skip_all, fields(caller = %session.role))]
pub async fn register_student(
    session: Session,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<StudentForm>,
) -> Result<(CookieJar, Redirect), RegisterStudentError> {
    let parent_id = match session.role {
        Role::Parent => Some(session.account_id),
        Role::Admin => form.parent_id,
        _ => return Err(AuthRejection::PermissionDenied.into()),
    };

    let StudentForm {
        person,
        age,
        school,
        coding_experience,
        program,
        program_schedule,
        cohort,
        ..
    } = form;
    let request = registration_request(
        person,
        RoleFields::Student {
            age,
            school,
            coding_experience,
            program,
            program_schedule,
            cohort,
            parent_id,
        },
    );
    register(
        &state,
        jar,
        request,
        "/register/student",
        ("/dashboard/parent", "Student registered."),
    )
    .await
    .map_err(RegisterStudentError::from)
}

#[tracing::instrument(name = "RegisterTeacher", skip_all)]
pub async fn register_teacher(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<TeacherForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let TeacherForm {
        person,
        course,
        residence,
    } = form;
    let request = registration_request(person, RoleFields::Teacher { course, residence });
    register(
        &state,
        jar,
        request,
        "/register/teacher",
        ("/admin/accounts/teacher", "Teacher registered."),
    )
    .await
}

#[tracing::instrument(name = "RegisterAdmin", skip_all)]
pub async fn register_admin(
    _admin: AdminSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AdminForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let AdminForm {
        person,
        residence,
        department,
    } = form;
    let request = registration_request(person, RoleFields::Admin { residence, department });
    register(
        &state,
        jar,
        request,
        "/register/admin",
        ("/admin/accounts/admin", "Admin registered."),
    )
    .await
}
