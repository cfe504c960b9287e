use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::db::normalize_email;
use crate::server::types::ApiErrorType;

/// Header carrying the signed-in user's email, set by the auth layer in front of us.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The normalized email of the user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEmail(pub String);

/// Rejects requests without a usable user email and exposes it to handlers.
pub async fn require_user(mut req: Request, next: Next) -> Response {
    let email = req
        .headers()
        .get(USER_EMAIL_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(normalize_email)
        .filter(|email| email.contains('@'));

    match email {
        Some(email) => {
            req.extensions_mut().insert(UserEmail(email));
            next.run(req).await
        }
        None => ApiErrorType::from((
            StatusCode::UNAUTHORIZED,
            "User email required",
            Some(format!("Missing or invalid {USER_EMAIL_HEADER} header")),
        ))
        .into_response(),
    }
}
