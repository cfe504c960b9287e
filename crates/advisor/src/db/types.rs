/// Database types for stored profiles and course history
use serde::{Deserialize, Serialize};

use crate::transcript::CourseRecord;

/// A course as it is kept in a user's course history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptCourse {
    pub course_number: String,
    pub course_name: String,
    pub grade: String,
    pub credits: f32,
    pub term: String,
}

impl From<&CourseRecord> for TranscriptCourse {
    fn from(course: &CourseRecord) -> Self {
        Self {
            course_number: course.code.clone(),
            course_name: course.description.clone(),
            grade: course.grade.clone(),
            credits: course.credits,
            term: course.term.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbUser {
    pub email: String,
    pub full_name: String,
    pub student_id: String,
    pub date_of_birth: String,
    pub created_at: String,
    pub updated_at: String,
}
