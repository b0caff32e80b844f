use uuid::Uuid;

use soma_core::{AttendanceRecord, AttendanceStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListAttendanceError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// A teacher's own attendance log; other teachers' records are invisible.
pub struct ListAttendanceUseCase<'a, T>
where
    T: AttendanceStore + ?Sized,
{
    attendance_store: &'a T,
}

impl<'a, T> ListAttendanceUseCase<'a, T>
where
    T: AttendanceStore + ?Sized,
{
    pub fn new(attendance_store: &'a T) -> Self {
        Self { attendance_store }
    }

    #[tracing::instrument(name = "ListAttendanceUseCase::execute", skip_all, fields(teacher_id = %teacher_id))]
    pub async fn execute(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<AttendanceRecord>, ListAttendanceError> {
        self.attendance_store
            .list_for_teacher(teacher_id)
            .await
            .map_err(|e| ListAttendanceError::UnexpectedError(e.to_string()))
    }
}
