//! Attendance routes. Teachers only; each teacher records and reads their
//! own lessons.

use axum::extract::State;
use axum::response::Redirect;
use axum::{Form, Json};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use serde::Deserialize;
use soma_application::{
    ListAttendanceError, ListAttendanceUseCase, RecordAttendanceError, RecordAttendanceUseCase,
};
use soma_core::{AttendanceRecord, NewAttendanceRecord};

use crate::cookies::flash;
use crate::extract::TeacherSession;
use crate::routes::UnexpectedError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttendanceForm {
    pub student_first_name: String,
    pub program: String,
    pub cohort: String,
    pub program_schedule: String,
    pub lesson_number: i32,
    pub hours: i32,
    /// `YYYY-MM-DD`, as submitted by a date input.
    pub lesson_date: String,
}

#[tracing::instrument(name = "RecordAttendance", skip_all, fields(teacher_id = %teacher.0.account_id))]
pub async fn record_attendance(
    teacher: TeacherSession,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AttendanceForm>,
) -> Result<(CookieJar, Redirect), UnexpectedError> {
    let Ok(lesson_date) = NaiveDate::parse_from_str(&form.lesson_date, "%Y-%m-%d") else {
        return Ok((
            flash(jar, "lesson_date: expected YYYY-MM-DD"),
            Redirect::to("/attendance"),
        ));
    };

    let record = NewAttendanceRecord {
        student_first_name: form.student_first_name,
        program: form.program,
        cohort: form.cohort,
        program_schedule: form.program_schedule,
        lesson_number: form.lesson_number,
        hours: form.hours,
        lesson_date: lesson_date.and_time(chrono::NaiveTime::MIN).and_utc(),
        teacher_id: teacher.0.account_id,
    };

    RecordAttendanceUseCase::new(state.attendance_store.as_ref())
        .execute(record)
        .await
        .map_err(|RecordAttendanceError::UnexpectedError(e)| UnexpectedError(e))?;

    Ok((flash(jar, "Attendance recorded"), Redirect::to("/attendance")))
}

#[tracing::instrument(name = "ListAttendance", skip_all, fields(teacher_id = %teacher.0.account_id))]
pub async fn list_attendance(
    teacher: TeacherSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceRecord>>, UnexpectedError> {
    let records = ListAttendanceUseCase::new(state.attendance_store.as_ref())
        .execute(teacher.0.account_id)
        .await
        .map_err(|ListAttendanceError::UnexpectedError(e)| UnexpectedError(e))?;

    Ok(Json(records))
}
