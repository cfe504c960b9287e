//! Line grammars for transcript text.
//!
//! Each course rule is a regex with the named groups `code`, `desc`,
//! `attempted` and `earned`; completed-course rules also capture `grade`.
//! Rules are tried in table order and the first match wins.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::types::{CourseRecord, GradeValidator, DEFAULT_CREDITS, IN_PROGRESS};

/// Matches term headers like "Fall 2023" or "SPRING 2024"
pub(crate) static TERM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Fall|Spring|Summer|Winter)\s+(20\d{2})\b").unwrap());

const CODE: &str = r"(?P<code>[A-Z]{2,4}\s+\d{3}[A-Z]?)";
const GRADE: &str = r"(?P<grade>A[+-]?|B[+-]?|C[+-]?|D[+-]?|E|F|W|IP|P|S)";

/// What a matching line contributes to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Completed,
    InProgress,
}

/// One entry in the ordered grammar table.
pub(crate) struct LineRule {
    pub name: &'static str,
    pub kind: LineKind,
    pattern: Regex,
}

impl LineRule {
    fn new(name: &'static str, kind: LineKind, pattern: String) -> Self {
        Self {
            name,
            kind,
            // Patterns are compile-time constants
            pattern: Regex::new(&pattern).unwrap(),
        }
    }

    /// Applies the rule to a trimmed line, returning the course it describes.
    pub fn apply(&self, line: &str, term: &str) -> Option<CourseRecord> {
        let caps = self.pattern.captures(line)?;
        match self.kind {
            LineKind::Completed => completed_course(&caps, term),
            LineKind::InProgress => in_progress_course(&caps, term),
        }
    }
}

/// Course grammars in evaluation order.
///
/// UofA layout: `CODE  DESCRIPTION  AHRS  EHRS  GRADE  POINTS`, e.g.
/// `CSC 110  Computer Programming I  4.000  4.000  B  12.000`. Courses in
/// progress print `0.000` earned hours and no grade.
pub(crate) static LINE_RULES: LazyLock<Vec<LineRule>> = LazyLock::new(|| {
    vec![
        LineRule::new(
            "completed_with_points",
            LineKind::Completed,
            format!(
                r"^{CODE}\s+(?P<desc>.+?)\s+(?P<attempted>\d+\.\d{{3}})\s+(?P<earned>\d+\.\d{{3}})\s+{GRADE}\s+\d+\.\d{{3}}"
            ),
        ),
        LineRule::new(
            "completed",
            LineKind::Completed,
            format!(
                r"\b{CODE}\s+(?P<desc>.+?)\s+(?P<attempted>\d+\.?\d*)\s+(?P<earned>\d+\.?\d*)\s+{GRADE}(?:\s|$)"
            ),
        ),
        LineRule::new(
            "in_progress_with_points",
            LineKind::InProgress,
            format!(
                r"^{CODE}\s+(?P<desc>.+?)\s+(?P<attempted>\d+\.\d{{3}})\s+(?P<earned>0\.000)\s+0\.000\s*$"
            ),
        ),
        LineRule::new(
            "in_progress",
            LineKind::InProgress,
            format!(
                r"^{CODE}\s+(?P<desc>.+?)\s+(?P<attempted>\d+\.\d{{3}})\s+(?P<earned>0\.000)\s*$"
            ),
        ),
        LineRule::new(
            "in_progress_loose",
            LineKind::InProgress,
            format!(
                r"\b{CODE}\s+(?P<desc>.+?)\s+(?P<attempted>\d+\.\d{{3}})\s+(?P<earned>0\.000)(?:\s+0\.000)?(?:\s|$)"
            ),
        ),
        LineRule::new(
            "in_progress_generic",
            LineKind::InProgress,
            format!(r"\b{CODE}\s+(?P<desc>.+?)\s+(?P<attempted>\d+\.?\d*)\s+(?P<earned>\d+\.?\d*)"),
        ),
    ]
});

/// Returns true for table headers and summary rows.
pub(crate) fn is_skipped_line(line: &str) -> bool {
    (line.contains("Course") && line.contains("Description"))
        || line.contains("AHRS")
        || line.contains("EHRS")
        || line.contains("GPA")
        || line.starts_with("Course Attrib")
}

/// Returns the `"<Season> <Year>"` label if the line is a term header.
pub(crate) fn match_term_header(line: &str) -> Option<String> {
    let caps = TERM_REGEX.captures(line)?;
    let season = title_case(&caps[1]);
    Some(format!("{} {}", season, &caps[2]))
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn completed_course(caps: &Captures<'_>, term: &str) -> Option<CourseRecord> {
    let grade = caps
        .name("grade")
        .map(|m| m.as_str())
        .filter(|g| GradeValidator::is_valid_grade(g))?;
    Some(CourseRecord {
        code: normalize_code(&caps["code"]),
        description: caps["desc"].trim().to_string(),
        grade: grade.to_string(),
        credits: credits_from(&caps["attempted"], &caps["earned"]),
        term: term.to_string(),
    })
}

fn in_progress_course(caps: &Captures<'_>, term: &str) -> Option<CourseRecord> {
    // Earned hours of exactly zero mark work still in progress
    if caps["earned"].parse::<f32>().ok()? != 0.0 {
        return None;
    }

    let description = caps["desc"].trim();
    if description.len() <= 2 || description.contains("Description") {
        return None;
    }

    Some(CourseRecord {
        code: normalize_code(&caps["code"]),
        description: description.to_string(),
        grade: IN_PROGRESS.to_string(),
        credits: credits_from(&caps["attempted"], &caps["earned"]),
        term: term.to_string(),
    })
}

/// Earned hours, else attempted hours, else the default.
fn credits_from(attempted: &str, earned: &str) -> f32 {
    [earned, attempted]
        .iter()
        .filter_map(|s| s.parse::<f32>().ok())
        .find(|&hours| hours > 0.0 && hours.is_finite())
        .unwrap_or(DEFAULT_CREDITS)
}

/// Collapses the whitespace between department and number to one space.
fn normalize_code(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
