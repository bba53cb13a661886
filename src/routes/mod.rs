use actix_web::{get, http::StatusCode, HttpResponse};
use tracing::{event, Level};

use crate::types::{AccountError, ErrorResponse};

mod accounts;

pub use accounts::account_routes;

#[get("/health-check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Serializes an [`AccountError`] as `{error, code}` with the HTTP status set
/// to the numeric code callers branch on. Internal detail is logged, not
/// echoed.
pub fn error_response(e: AccountError) -> HttpResponse {
    let code = e.code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let error = if status.is_server_error() {
        event!(target: "backend", Level::ERROR, "{}", e);
        "Some unexpected error happened. Please try again later.".to_string()
    } else {
        e.to_string()
    };
    HttpResponse::build(status).json(ErrorResponse { error, code })
}
