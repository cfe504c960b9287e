use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::server::middleware::user_validator::UserEmail;
use crate::server::types::ApiErrorType;
use crate::types::AppState;
use crate::verify::Profile;

/// GET /user/transcript
/// Returns the user's stored course history
pub async fn get_transcript(
    State(s): State<Arc<AppState>>,
    Extension(UserEmail(email)): Extension<UserEmail>,
) -> Response {
    info!("GET /user/transcript ({})", email);

    match s.profile_db.get_transcript(&email) {
        Ok(courses) => (StatusCode::OK, Json(json!({ "courses": courses }))).into_response(),
        Err(e) => {
            error!("Failed to fetch transcript for {}: {}", email, e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch transcript",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// GET /user/profile
/// Returns the identity fields used for transcript verification
pub async fn get_profile(
    State(s): State<Arc<AppState>>,
    Extension(UserEmail(email)): Extension<UserEmail>,
) -> Response {
    info!("GET /user/profile ({})", email);

    match s.profile_db.get_profile(&email) {
        // New users get an empty profile to fill in
        Ok(profile) => (StatusCode::OK, Json(profile.unwrap_or_default())).into_response(),
        Err(e) => {
            error!("Failed to fetch profile for {}: {}", email, e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch profile",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// PUT /user/profile
/// Creates or replaces the user's identity fields
pub async fn put_profile(
    State(s): State<Arc<AppState>>,
    Extension(UserEmail(email)): Extension<UserEmail>,
    Json(profile): Json<Profile>,
) -> Response {
    info!("PUT /user/profile ({})", email);

    if let Err(e) = s.profile_db.upsert_profile(&email, &profile) {
        error!("Failed to save profile for {}: {}", email, e);
        return ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save profile",
            Some(e.to_string()),
        ))
        .into_response();
    }

    match s.profile_db.get_profile(&email) {
        Ok(Some(saved)) => (StatusCode::OK, Json(saved)).into_response(),
        Ok(None) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch profile",
            Some(e.to_string()),
        ))
        .into_response(),
    }
}
