//! Identity verification of parsed transcripts against stored profiles.
mod types;

pub use types::*;

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::transcript::StudentInfo;

static NUMERIC_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").unwrap());
static ISO_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static LONG_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})$").unwrap());

const MONTHS: [(&str, &str, u32); 12] = [
    ("jan", "january", 1),
    ("feb", "february", 2),
    ("mar", "march", 3),
    ("apr", "april", 4),
    ("may", "may", 5),
    ("jun", "june", 6),
    ("jul", "july", 7),
    ("aug", "august", 8),
    ("sep", "september", 9),
    ("oct", "october", 10),
    ("nov", "november", 11),
    ("dec", "december", 12),
];

const VERIFIED_MESSAGE: &str = "Transcript verified: the document matches your profile.";

/// A verdict rule: the transcript is verified if `holds` is true.
struct VerdictRule {
    name: &'static str,
    holds: fn(&MatchSignals) -> bool,
}

/// Evaluated in order; the first rule that holds verifies the transcript.
const VERDICT_RULES: [VerdictRule; 3] = [
    VerdictRule {
        name: "student_id",
        holds: |s| s.student_id_match,
    },
    VerdictRule {
        name: "name_and_dob",
        holds: |s| s.name_match && s.dob_match,
    },
    VerdictRule {
        name: "name_without_dob",
        holds: |s| s.name_match && !s.has_dob,
    },
];

/// Decides whether the parsed transcript belongs to `profile`.
///
/// Disagreement is a normal outcome reported through the result, never an
/// error. All three sub-matches are always computed and reported.
pub fn verify_identity(extracted: &StudentInfo, profile: &Profile) -> VerificationResult {
    let signals = compute_signals(extracted, profile);

    let fired = VERDICT_RULES
        .iter()
        .find(|rule| (rule.holds)(&signals))
        .map(|rule| rule.name);

    debug!(rule = ?fired, signals = ?signals, "Identity verification evaluated");

    let verified = fired.is_some();
    let message = if verified {
        VERIFIED_MESSAGE.to_string()
    } else {
        failure_message(&signals)
    };

    VerificationResult {
        verified,
        name_match: signals.name_match,
        student_id_match: signals.student_id_match,
        dob_match: signals.dob_match,
        message,
        extracted_info: extracted.clone(),
    }
}

/// Computes every sub-match between the extracted fields and the profile.
pub fn compute_signals(extracted: &StudentInfo, profile: &Profile) -> MatchSignals {
    let name = present(&extracted.name);
    let student_id = present(&extracted.student_id);
    let dob = present(&extracted.date_of_birth);

    MatchSignals {
        name_match: name.is_some_and(|n| names_match(n, &profile.full_name)),
        student_id_match: student_id.is_some_and(|id| student_ids_match(id, &profile.student_id)),
        dob_match: dob.is_some_and(|d| dates_match(d, &profile.date_of_birth)),
        has_name: name.is_some(),
        has_student_id: student_id.is_some(),
        has_dob: dob.is_some(),
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn failure_message(signals: &MatchSignals) -> String {
    if signals.nothing_to_compare() {
        return "Transcript could not be verified: insufficient information to verify.".to_string();
    }

    let mut mismatched = Vec::new();
    if signals.has_name && !signals.name_match {
        mismatched.push("name");
    }
    if signals.has_student_id && !signals.student_id_match {
        mismatched.push("student ID");
    }
    if signals.has_dob && !signals.dob_match {
        mismatched.push("date of birth");
    }

    if mismatched.is_empty() {
        "Transcript could not be verified: a matching name or student ID is required.".to_string()
    } else {
        format!(
            "Warning: the {} on this transcript {} not match your profile.",
            mismatched.join(", "),
            if mismatched.len() == 1 { "does" } else { "do" }
        )
    }
}

/// Lower-cases, keeps only letters and spaces, and collapses whitespace.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fuzzy name comparison tolerant of middle names, initials and reordering.
pub fn names_match(extracted: &str, profile: &str) -> bool {
    let a = normalize_name(extracted);
    let b = normalize_name(profile);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    // Initials are ignored for the token rules
    let a_tokens: Vec<&str> = a.split(' ').filter(|t| t.chars().count() > 1).collect();
    let b_tokens: Vec<&str> = b.split(' ').filter(|t| t.chars().count() > 1).collect();

    if a_tokens.len() >= 2
        && b_tokens.len() >= 2
        && a_tokens.first() == b_tokens.first()
        && a_tokens.last() == b_tokens.last()
    {
        return true;
    }

    let a_set: HashSet<&str> = a_tokens.iter().copied().collect();
    let shared = b_tokens
        .iter()
        .copied()
        .collect::<HashSet<&str>>()
        .intersection(&a_set)
        .count();

    shared >= 2 || (shared == 1 && b.split(' ').count() == 1)
}

/// Rewrites a recognized date shape as `YYYY-MM-DD`.
///
/// Recognized: `MM/DD/YYYY`, `MM-DD-YYYY`, `YYYY-MM-DD` and `Month DD, YYYY`
/// (abbreviated or full month names). Anything else comes back trimmed but
/// otherwise unchanged.
pub fn normalize_date(date: &str) -> String {
    let date = date.trim();

    if let Some(caps) = NUMERIC_DATE_REGEX.captures(date) {
        return format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[1], &caps[2]);
    }

    if let Some(caps) = ISO_DATE_REGEX.captures(date) {
        return format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = LONG_DATE_REGEX.captures(date) {
        if let Some(month) = month_number(&caps[1]) {
            return format!("{}-{:02}-{:0>2}", &caps[3], month, &caps[2]);
        }
    }

    date.to_string()
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(short, full, _)| lower == *short || lower == *full)
        .map(|(_, _, number)| *number)
}

/// Compares two dates after normalization. Blank dates never match.
pub fn dates_match(a: &str, b: &str) -> bool {
    if a.trim().is_empty() || b.trim().is_empty() {
        return false;
    }
    normalize_date(a) == normalize_date(b)
}

/// Student IDs compare case-insensitively, ignoring spaces and dashes.
pub fn student_ids_match(extracted: &str, profile: &str) -> bool {
    let clean = |id: &str| -> String {
        id.chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_lowercase)
            .collect()
    };

    let a = clean(extracted);
    !a.is_empty() && a == clean(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, id: &str, dob: &str) -> Profile {
        Profile {
            full_name: name.to_string(),
            student_id: id.to_string(),
            date_of_birth: dob.to_string(),
        }
    }

    fn info(name: Option<&str>, id: Option<&str>, dob: Option<&str>) -> StudentInfo {
        StudentInfo {
            name: name.map(str::to_string),
            student_id: id.map(str::to_string),
            date_of_birth: dob.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  John Q. Smith "), "john q smith");
        assert_eq!(normalize_name("O'Brien,   Pat"), "obrien pat");
        assert_eq!(normalize_name("123 ."), "");
    }

    #[test]
    fn test_names_match_middle_initial() {
        assert!(names_match("John Q. Smith", "john smith"));
        assert!(names_match("Karan Kumar", "KARAN KUMAR"));
    }

    #[test]
    fn test_names_match_shared_surname_only() {
        assert!(!names_match("Jane Doe", "John Doe"));
    }

    #[test]
    fn test_names_match_reordered() {
        assert!(names_match("Smith, John Andrew", "John Smith"));
        assert!(names_match("Kumar Karan", "Karan Kumar"));
    }

    #[test]
    fn test_names_match_single_token_profile() {
        assert!(names_match("Madonna Ciccone", "Madonna"));
        assert!(!names_match("Prince Nelson", "Madonna"));
    }

    #[test]
    fn test_empty_names_never_match() {
        assert!(!names_match("", ""));
        assert!(!names_match("...", "..."));
        assert!(!names_match("John Smith", ""));
    }

    #[test]
    fn test_dates_match_shapes() {
        assert!(dates_match("03/14/2002", "2002-03-14"));
        assert!(dates_match("3-14-2002", "2002-3-14"));
        assert!(dates_match("March 14, 2002", "2002-03-14"));
        assert!(dates_match("Mar 14 2002", "03/14/2002"));
        assert!(!dates_match("03/15/2002", "2002-03-14"));
    }

    #[test]
    fn test_unrecognized_dates_pass_through() {
        assert_eq!(normalize_date("14.03.2002"), "14.03.2002");
        assert_eq!(normalize_date("Smarch 14, 2002"), "Smarch 14, 2002");
        assert!(!dates_match("14.03.2002", "2002-03-14"));
        assert!(!dates_match("", ""));
    }

    #[test]
    fn test_student_id_overrides_name_mismatch() {
        let result = verify_identity(
            &info(Some("Someone Else"), Some("23841840"), None),
            &profile("Karan Kumar", "23841840", ""),
        );
        assert!(result.verified);
        assert!(result.student_id_match);
        assert!(!result.name_match);
    }

    #[test]
    fn test_name_and_dob_verify() {
        let result = verify_identity(
            &info(Some("Karan Kumar"), None, Some("March 14, 2002")),
            &profile("Karan Kumar", "", "2002-03-14"),
        );
        assert!(result.verified);
        assert!(result.dob_match);
    }

    #[test]
    fn test_name_without_dob_on_transcript_verifies() {
        let result = verify_identity(
            &info(Some("Karan Kumar"), None, None),
            &profile("Karan Kumar", "", "2002-03-14"),
        );
        assert!(result.verified);
        assert!(!result.dob_match);
        assert_eq!(result.message, VERIFIED_MESSAGE);
    }

    #[test]
    fn test_name_match_with_wrong_dob_fails() {
        let result = verify_identity(
            &info(Some("Karan Kumar"), None, Some("01/01/2000")),
            &profile("Karan Kumar", "", "2002-03-14"),
        );
        assert!(!result.verified);
        assert!(result.name_match);
        assert!(result.message.contains("date of birth"));
        assert!(!result.message.contains("name,"));
    }

    #[test]
    fn test_unrecognized_transcript_dob_still_blocks_name_match() {
        let parsed = crate::transcript::parse_transcript(
            "Name: Karan Kumar\nDate of Birth: 1999.01.01\nFall 2023\n",
        );
        let result = verify_identity(
            &parsed.student_info,
            &profile("Karan Kumar", "", "2002-03-14"),
        );
        assert!(result.name_match);
        assert!(!result.dob_match);
        assert!(!result.verified);
        assert!(result.message.contains("date of birth"));
    }

    #[test]
    fn test_failure_lists_only_present_fields() {
        let result = verify_identity(
            &info(Some("Jane Doe"), Some("111"), None),
            &profile("John Doe", "222", "2002-03-14"),
        );
        assert!(!result.verified);
        assert_eq!(
            result.message,
            "Warning: the name, student ID on this transcript do not match your profile."
        );
    }

    #[test]
    fn test_insufficient_information() {
        let result = verify_identity(
            &StudentInfo::default(),
            &profile("Karan Kumar", "23841840", "2002-03-14"),
        );
        assert!(!result.verified);
        assert!(result.message.contains("insufficient information to verify"));
    }

    #[test]
    fn test_matching_dob_alone_is_not_enough() {
        let result = verify_identity(
            &info(None, None, Some("2002-03-14")),
            &profile("Karan Kumar", "", "2002-03-14"),
        );
        assert!(!result.verified);
        assert!(result.dob_match);
        assert!(result.message.contains("matching name or student ID"));
    }

    #[test]
    fn test_student_id_formatting_is_ignored() {
        assert!(student_ids_match("2384-1840", " 23841840 "));
        assert!(!student_ids_match("", ""));
    }
}
