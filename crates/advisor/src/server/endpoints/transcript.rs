//! API endpoints for transcript parsing and upload.
//!
//! Uploads go through extract -> parse -> (load profile -> verify -> persist),
//! with every step logged under one correlation id.

use axum::{
    extract::{Extension, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::server::middleware::user_validator::UserEmail;
use crate::server::types::ApiErrorType;
use crate::server::util::{base_mime, generate_correlation_id, mime_from_file_name};
use crate::transcript::{extract_with_timeout, summarize, ParsedTranscript, TranscriptError};
use crate::types::AppState;
use crate::verify::verify_identity;

const PDF_MIME: &str = "application/pdf";
const TEXT_MIME: &str = "text/plain";

/// Body of `POST /transcript/parse`.
#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub text: Option<String>,
}

/// A file read out of a multipart upload.
struct UploadedFile {
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

/// Reads the `file` field out of a multipart body.
async fn read_upload(multipart: &mut Multipart, max_bytes: usize) -> Result<UploadedFile, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart body: {}", e);
                let status = e.status();
                return Err(ApiErrorType::from((
                    status,
                    "Failed to read upload",
                    Some(e.body_text()),
                ))
                .into_response());
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("transcript").to_string();
        let mime = field
            .content_type()
            .map(base_mime)
            .filter(|m| !m.is_empty() && m != "application/octet-stream")
            .or_else(|| mime_from_file_name(&file_name).map(str::to_string))
            .unwrap_or_default();

        let bytes = field.bytes().await.map_err(|e| {
            ApiErrorType::from((e.status(), "Failed to read file data", Some(e.body_text())))
                .into_response()
        })?;

        if bytes.len() > max_bytes {
            return Err(ApiErrorType::from((
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large",
                Some(format!("Maximum upload size is {} bytes", max_bytes)),
            ))
            .into_response());
        }

        return Ok(UploadedFile {
            file_name,
            mime,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiErrorType::from(TranscriptError::NoInput).into_response())
}

/// Extracts text from an uploaded file and parses it.
async fn ingest_upload(
    state: &Arc<AppState>,
    file: UploadedFile,
    correlation_id: &str,
) -> Result<ParsedTranscript, TranscriptError> {
    let extractor = match file.mime.as_str() {
        PDF_MIME => state.pdf_extractor.clone(),
        TEXT_MIME => state.text_extractor.clone(),
        "" => {
            return Err(TranscriptError::UnsupportedMediaType {
                mime: "unknown".to_string(),
            })
        }
        other => {
            return Err(TranscriptError::UnsupportedMediaType {
                mime: other.to_string(),
            })
        }
    };

    info!(
        correlation_id = %correlation_id,
        file_name = %file.file_name,
        mime = %file.mime,
        size = file.bytes.len(),
        "Extracting transcript text"
    );

    let text =
        extract_with_timeout(extractor, file.bytes, state.config.extraction_timeout()).await?;

    Ok(state.parse_cache.get_or_parse(&text))
}

/// POST /transcript/parse
///
/// Parses transcript text that was already extracted by the client.
pub async fn post_parse_text(
    State(s): State<Arc<AppState>>,
    Json(body): Json<ParseTextRequest>,
) -> Response {
    let Some(text) = body.text else {
        return ApiErrorType::from(TranscriptError::NoInput).into_response();
    };

    info!("POST /transcript/parse ({} bytes)", text.len());

    let parsed = s.parse_cache.get_or_parse(&text);
    let summary = summarize(&parsed);

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": parsed,
            "summary": summary,
        })),
    )
        .into_response()
}

/// POST /upload/transcript
///
/// Parses an uploaded PDF or text file without touching any stored profile.
pub async fn post_upload_transcript(
    State(s): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(correlation_id = %correlation_id, "POST /upload/transcript");

    let file = match read_upload(&mut multipart, s.config.max_upload_bytes).await {
        Ok(file) => file,
        Err(response) => return response,
    };

    match ingest_upload(&s, file, &correlation_id).await {
        Ok(parsed) => {
            let summary = summarize(&parsed);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": parsed,
                    "summary": summary,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(correlation_id = %correlation_id, error = %e, stage = %e.stage(), "Transcript upload failed");
            ApiErrorType::from(e).into_response()
        }
    }
}

/// POST /user/transcript
///
/// Parses an upload, verifies it against the user's profile and stores the
/// courses. Both the parse result and the verification verdict are returned.
pub async fn post_user_transcript(
    State(s): State<Arc<AppState>>,
    Extension(UserEmail(email)): Extension<UserEmail>,
    mut multipart: Multipart,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(correlation_id = %correlation_id, email = %email, "POST /user/transcript");

    let file = match read_upload(&mut multipart, s.config.max_upload_bytes).await {
        Ok(file) => file,
        Err(response) => return response,
    };

    let parsed = match ingest_upload(&s, file, &correlation_id).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(correlation_id = %correlation_id, error = %e, stage = %e.stage(), "Transcript upload failed");
            return ApiErrorType::from(e).into_response();
        }
    };

    let profile = match s.profile_db.get_profile(&email) {
        Ok(profile) => profile.unwrap_or_default(),
        Err(e) => {
            error!(correlation_id = %correlation_id, error = %e, "Failed to load profile");
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load profile",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let verification = verify_identity(&parsed.student_info, &profile);
    info!(
        correlation_id = %correlation_id,
        verified = verification.verified,
        name_match = verification.name_match,
        student_id_match = verification.student_id_match,
        dob_match = verification.dob_match,
        "Transcript identity checked"
    );

    let saved = if verification.verified || s.config.persist_unverified {
        match s.profile_db.replace_transcript(&email, &parsed.courses) {
            Ok(count) => count,
            Err(e) => {
                error!(correlation_id = %correlation_id, error = %e, "Failed to save courses");
                return ApiErrorType::from((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save courses",
                    Some(e.to_string()),
                ))
                .into_response();
            }
        }
    } else {
        warn!(correlation_id = %correlation_id, "Unverified transcript not saved");
        0
    };

    let summary = summarize(&parsed);
    info!(correlation_id = %correlation_id, courses = saved, "Transcript upload complete");

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": parsed,
            "summary": summary,
            "verification": verification,
            "saved": saved,
        })),
    )
        .into_response()
}
