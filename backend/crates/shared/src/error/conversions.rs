//! Error conversions
//!
//! HTTP rendering of [`AppError`] (feature `axum`).

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::{HeaderValue, StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "status": self.status_code(),
            "title": self.kind().as_str(),
            "message": self.message(),
            "action": self.action(),
        });

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
