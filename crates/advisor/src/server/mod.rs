use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{status, transcript, user};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;
mod util;

pub use middleware::user_validator::USER_EMAIL_HEADER;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints act on the signed-in user's record
    let user_router = Router::new()
        .route(
            "/user/transcript",
            get(user::get_transcript).post(transcript::post_user_transcript),
        )
        .route("/user/profile", get(user::get_profile).put(user::put_profile))
        .layer(mw::from_fn(user_validator::require_user));

    let transcript_router = Router::new()
        .route("/transcript/parse", post(transcript::post_parse_text))
        .route("/upload/transcript", post(transcript::post_upload_transcript))
        .route("/transcript/cache_stats", get(status::get_cache_stats))
        .route(
            "/transcript/invalidate_cache",
            post(status::invalidate_cache),
        );

    Router::new()
        .route("/health", get(status::get_health))
        .merge(transcript_router)
        .merge(user_router)
        .layer(DefaultBodyLimit::max(
            app_state.config.max_upload_bytes + MULTIPART_OVERHEAD,
        ))
        .with_state(app_state)
}
