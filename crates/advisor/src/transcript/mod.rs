//! Transcript ingestion: turns extracted transcript text into course records.
mod cache;
mod error;
mod extract;
mod rules;
mod types;

pub use cache::{DocumentKey, ParseCache, ParseCacheStats};
pub use error::{ParseStage, TranscriptError};
pub use extract::{extract_with_timeout, PdfTextExtractor, PlainTextExtractor, TextExtractor};
pub use types::*;

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

use rules::{is_skipped_line, match_term_header, LineKind, LINE_RULES};

// Format: "Name: Karan Kumar  Student ID: 23841840"
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\bName:[ \t]*(.+?)(?:[ \t]+Student ID:|[ \t]*$)").unwrap()
});
static STUDENT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Student ID:\s*(\d+)").unwrap());
// Value is taken verbatim up to the end of the line or a column gap, whatever its shape
static DOB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)(?:Date of Birth|Birth Date|DOB):[ \t]*(\S[^\r\n]*?)(?:[ \t]{2,}|[ \t]*\r?$)")
        .unwrap()
});

/// Parses extracted transcript text into student info and course records.
///
/// The scan is a single forward pass over the lines. A term header updates
/// the current term; header and summary rows are skipped; every other line
/// is tried against the course grammars in order. Lines nothing matches are
/// dropped. Courses are deduplicated by code and the last occurrence wins,
/// keeping the position where the code first appeared.
pub fn parse_transcript(text: &str) -> ParsedTranscript {
    let mut ledger = CourseLedger::default();
    let mut current_term = UNKNOWN_TERM.to_string();
    let mut completed = 0usize;
    let mut in_progress = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(term) = match_term_header(line) {
            debug!(term = %term, "Entering term");
            current_term = term;
            continue;
        }

        if is_skipped_line(line) {
            continue;
        }

        let matched = LINE_RULES
            .iter()
            .find_map(|rule| rule.apply(line, &current_term).map(|course| (rule, course)));

        if let Some((rule, course)) = matched {
            debug!(rule = rule.name, course = %course.code, "Matched course line");
            match rule.kind {
                LineKind::Completed => completed += 1,
                LineKind::InProgress => in_progress += 1,
            }
            ledger.record(course);
        }
    }

    let student_info = extract_student_info(text);
    let courses = ledger.finish();

    info!(
        courses = courses.len(),
        completed_lines = completed,
        in_progress_lines = in_progress,
        "Parsed transcript"
    );

    ParsedTranscript {
        student_info,
        courses,
    }
}

/// Scans the whole text for name, student ID and date of birth.
///
/// Each field is searched independently; a miss leaves that field empty.
pub fn extract_student_info(text: &str) -> StudentInfo {
    let name = NAME_REGEX
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty());

    let student_id = STUDENT_ID_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string());

    let date_of_birth = DOB_REGEX
        .captures(text)
        .map(|caps| caps[1].trim().to_string());

    StudentInfo {
        name,
        student_id,
        date_of_birth,
    }
}

/// Computes course counts and credit totals for a parse result.
pub fn summarize(transcript: &ParsedTranscript) -> TranscriptSummary {
    let mut summary = TranscriptSummary {
        total_courses: transcript.courses.len(),
        ..Default::default()
    };

    for course in &transcript.courses {
        if course.is_in_progress() {
            summary.in_progress_courses += 1;
            summary.credits_in_progress += course.credits;
        } else {
            summary.completed_courses += 1;
            summary.credits_earned += GradeValidator::credits_earned(&course.grade, course.credits);
        }
    }

    summary
}

/// Insertion-ordered collection keyed by course code.
///
/// A later record for a code replaces the earlier one in place.
#[derive(Debug, Default)]
struct CourseLedger {
    positions: HashMap<String, usize>,
    courses: Vec<CourseRecord>,
}

impl CourseLedger {
    fn record(&mut self, course: CourseRecord) {
        match self.positions.get(&course.code) {
            Some(&idx) => self.courses[idx] = course,
            None => {
                self.positions.insert(course.code.clone(), self.courses.len());
                self.courses.push(course);
            }
        }
    }

    fn finish(self) -> Vec<CourseRecord> {
        self.courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
University of Arizona Unofficial Transcript
Name: Karan Kumar  Student ID: 23841840
Date of Birth: 03/14/2002

Fall 2023
Course Description AHRS EHRS Grade Points
CSC 110  Computer Programming I  4.000  4.000  B  12.000
MATH 125  Calculus I  3.000  3.000  E  0.000
Term GPA: 2.000
Spring 2024
MATH 125  Calculus I  3.000  3.000  A  12.000
CSC 210    Software Development    4.000    0.000    0.000
Course Attributes: Tier One
";

    #[test]
    fn test_end_to_end_sample() {
        let parsed = parse_transcript(SAMPLE);

        assert_eq!(parsed.courses.len(), 3);

        let csc110 = &parsed.courses[0];
        assert_eq!(csc110.code, "CSC 110");
        assert_eq!(csc110.grade, "B");
        assert_eq!(csc110.term, "Fall 2023");

        let math = &parsed.courses[1];
        assert_eq!(math.code, "MATH 125");
        assert_eq!(math.grade, "A");
        assert_eq!(math.term, "Spring 2024");

        let csc210 = &parsed.courses[2];
        assert_eq!(csc210.grade, IN_PROGRESS);
        assert_eq!(csc210.credits, 4.0);
        assert_eq!(csc210.term, "Spring 2024");

        assert_eq!(parsed.student_info.name.as_deref(), Some("Karan Kumar"));
        assert_eq!(parsed.student_info.student_id.as_deref(), Some("23841840"));
        assert_eq!(parsed.student_info.date_of_birth.as_deref(), Some("03/14/2002"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_transcript(SAMPLE), parse_transcript(SAMPLE));
    }

    #[test]
    fn test_retake_in_later_term_wins() {
        let text = "\
Fall 2023
CSC 210 Software Development 4.000 4.000 E 0.000
Spring 2024
CSC 210 Software Development 4.000 4.000 A 16.000
";
        let parsed = parse_transcript(text);
        assert_eq!(parsed.courses.len(), 1);
        assert_eq!(parsed.courses[0].grade, "A");
        assert_eq!(parsed.courses[0].term, "Spring 2024");
    }

    #[test]
    fn test_three_lines_one_header_two_records() {
        let text = "\
Fall 2024
CSC 110 Computer Programming I 4.000 4.000 B 12.000
CSC 210 Software Development 4.000 0.000 0.000
CSC 110 Computer Programming I 4.000 4.000 A 16.000
";
        let parsed = parse_transcript(text);
        assert_eq!(parsed.courses.len(), 2);
        assert_eq!(parsed.courses[0].code, "CSC 110");
        assert_eq!(parsed.courses[0].grade, "A");
        assert_eq!(parsed.courses[1].grade, IN_PROGRESS);
    }

    #[test]
    fn test_course_before_any_term_header() {
        let text = "\
CSC 110 Computer Programming I 4.000 4.000 B 12.000
Fall 2024
MATH 125 Calculus I 3.000 3.000 A 12.000
";
        let parsed = parse_transcript(text);
        assert_eq!(parsed.courses[0].term, UNKNOWN_TERM);
        assert_eq!(parsed.courses[1].term, "Fall 2024");
    }

    #[test]
    fn test_unrecognized_input_yields_empty_result() {
        let parsed = parse_transcript("this is not a transcript\n\n12345\n");
        assert!(parsed.courses.is_empty());
        assert!(parsed.student_info.is_empty());

        assert_eq!(parse_transcript(""), ParsedTranscript::default());
    }

    #[test]
    fn test_student_info_on_separate_lines() {
        let info = extract_student_info(
            "Student Name: Jane Q. Doe\nStudent ID: 12345678\nDOB: March 14, 2002\n",
        );
        assert_eq!(info.name.as_deref(), Some("Jane Q. Doe"));
        assert_eq!(info.student_id.as_deref(), Some("12345678"));
        assert_eq!(info.date_of_birth.as_deref(), Some("March 14, 2002"));
    }

    #[test]
    fn test_dob_kept_verbatim_in_any_shape() {
        let info = extract_student_info("Name: Karan Kumar\nDate of Birth: 1999.01.01\n");
        assert_eq!(info.date_of_birth.as_deref(), Some("1999.01.01"));

        let info = extract_student_info("DOB: 14 March 1999  Student ID: 23841840\r\n");
        assert_eq!(info.date_of_birth.as_deref(), Some("14 March 1999"));
        assert_eq!(info.student_id.as_deref(), Some("23841840"));

        let info = extract_student_info("Birth Date: 03/14/2002\r\nFall 2023\r\n");
        assert_eq!(info.date_of_birth.as_deref(), Some("03/14/2002"));
    }

    #[test]
    fn test_summary_totals() {
        let parsed = parse_transcript(SAMPLE);
        let summary = summarize(&parsed);

        assert_eq!(summary.total_courses, 3);
        assert_eq!(summary.completed_courses, 2);
        assert_eq!(summary.in_progress_courses, 1);
        assert_eq!(summary.credits_earned, 7.0);
        assert_eq!(summary.credits_in_progress, 4.0);
    }
}
