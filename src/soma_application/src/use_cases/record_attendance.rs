use soma_core::{AttendanceRecord, AttendanceStore, NewAttendanceRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordAttendanceError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Appends one taught lesson to the recording teacher's log.
pub struct RecordAttendanceUseCase<'a, T>
where
    T: AttendanceStore + ?Sized,
{
    attendance_store: &'a T,
}

impl<'a, T> RecordAttendanceUseCase<'a, T>
where
    T: AttendanceStore + ?Sized,
{
    pub fn new(attendance_store: &'a T) -> Self {
        Self { attendance_store }
    }

    #[tracing::instrument(name = "RecordAttendanceUseCase::execute", skip_all, fields(teacher_id = %record.teacher_id))]
    pub async fn execute(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, RecordAttendanceError> {
        self.attendance_store
            .record(record)
            .await
            .map_err(|e| RecordAttendanceError::UnexpectedError(e.to_string()))
    }
}
