//! Types for parsed transcript data.

use serde::{Deserialize, Serialize};

/// Term label used for course lines that appear before any term header.
pub const UNKNOWN_TERM: &str = "Unknown Term";

/// Grade sentinel for courses that are still being taken.
pub const IN_PROGRESS: &str = "IP";

/// Credits assumed when neither hours column yields a usable value.
pub const DEFAULT_CREDITS: f32 = 3.0;

/// One row of academic history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Canonical course code, e.g. `"CSC 210"` or `"ECE 175L"`.
    #[serde(rename = "course")]
    pub code: String,
    pub description: String,
    pub grade: String,
    pub credits: f32,
    pub term: String,
}

impl CourseRecord {
    pub fn is_in_progress(&self) -> bool {
        self.grade == IN_PROGRESS
    }
}

/// Identity fields found in the document. Any subset may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub date_of_birth: Option<String>,
}

impl StudentInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.student_id.is_none() && self.date_of_birth.is_none()
    }
}

/// Result of a single parse call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTranscript {
    pub student_info: StudentInfo,
    pub courses: Vec<CourseRecord>,
}

/// Aggregate counts reported alongside a parse result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub in_progress_courses: usize,
    pub credits_earned: f32,
    pub credits_in_progress: f32,
}

/// Grade alphabet helpers
#[derive(Debug, Clone)]
pub struct GradeValidator;

impl GradeValidator {
    /// Checks the token against the closed grade alphabet, `IP` included.
    pub fn is_valid_grade(grade: &str) -> bool {
        matches!(
            grade,
            "A+" | "A"
                | "A-"
                | "B+"
                | "B"
                | "B-"
                | "C+"
                | "C"
                | "C-"
                | "D+"
                | "D"
                | "D-"
                | "E"
                | "F"
                | "W"
                | "P"
                | "S"
                | "IP"
        )
    }

    /// Checks if a grade earns credit (D- or higher, or a pass mark)
    pub fn is_passing_grade(grade: &str) -> bool {
        matches!(
            grade,
            "A+" | "A" | "A-" | "B+" | "B" | "B-" | "C+" | "C" | "C-" | "D+" | "D" | "D-" | "P" | "S"
        )
    }

    /// Credits earned for a completed course based on its grade
    pub fn credits_earned(grade: &str, course_credits: f32) -> f32 {
        if Self::is_passing_grade(grade) {
            course_credits
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_alphabet_is_closed() {
        assert!(GradeValidator::is_valid_grade("A-"));
        assert!(GradeValidator::is_valid_grade("IP"));
        assert!(GradeValidator::is_valid_grade("S"));
        assert!(!GradeValidator::is_valid_grade("A/B"));
        assert!(!GradeValidator::is_valid_grade("E+"));
        assert!(!GradeValidator::is_valid_grade("TP"));
    }

    #[test]
    fn test_course_record_serializes_code_as_course() {
        let record = CourseRecord {
            code: "CSC 110".to_string(),
            description: "Computer Programming I".to_string(),
            grade: "B".to_string(),
            credits: 4.0,
            term: "Fall 2023".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["course"], "CSC 110");
        assert!(value.get("code").is_none());
    }

    #[test]
    fn test_failing_grades_earn_nothing() {
        assert_eq!(GradeValidator::credits_earned("E", 4.0), 0.0);
        assert_eq!(GradeValidator::credits_earned("W", 3.0), 0.0);
        assert_eq!(GradeValidator::credits_earned("B+", 3.0), 3.0);
    }
}
