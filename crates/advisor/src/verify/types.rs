//! Types for identity verification.

use serde::{Deserialize, Serialize};

use crate::transcript::StudentInfo;

/// Identity values the user entered on their account.
///
/// Empty strings mean the user never filled the field in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub date_of_birth: String,
}

/// Outcome of comparing a transcript against a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub name_match: bool,
    pub student_id_match: bool,
    pub dob_match: bool,
    pub message: String,
    pub extracted_info: StudentInfo,
}

/// Every sub-match plus which fields the transcript carried at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSignals {
    pub name_match: bool,
    pub student_id_match: bool,
    pub dob_match: bool,
    pub has_name: bool,
    pub has_student_id: bool,
    pub has_dob: bool,
}

impl MatchSignals {
    /// True if the transcript exposed none of the identity fields.
    pub fn nothing_to_compare(&self) -> bool {
        !self.has_name && !self.has_student_id && !self.has_dob
    }
}
