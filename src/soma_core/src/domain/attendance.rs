use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One lesson taught, recorded by a teacher. Append-only: records are never
/// mutated and disappear only when the owning teacher is deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_first_name: String,
    pub program: String,
    pub cohort: String,
    pub program_schedule: String,
    pub lesson_number: i32,
    pub hours: i32,
    pub lesson_date: DateTime<Utc>,
    pub teacher_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub student_first_name: String,
    pub program: String,
    pub cohort: String,
    pub program_schedule: String,
    pub lesson_number: i32,
    pub hours: i32,
    pub lesson_date: DateTime<Utc>,
    pub teacher_id: Uuid,
}
