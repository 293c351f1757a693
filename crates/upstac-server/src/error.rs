use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use upstac_core::error::UpstacError;

// ---------------------------------------------------------------------------
// Sentinels for guard failures
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 401 through the `anyhow::Error` chain.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

/// Carries an explicit HTTP 403 through the `anyhow::Error` chain.
#[derive(Debug)]
struct ForbiddenError(String);

impl std::fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ForbiddenError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Every domain failure becomes a 400 carrying the failure message, so
/// clients can show it as-is. Concurrent-write conflicts are 409 and are the
/// only responses worth retrying.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(UpstacError::Validation(msg.into()).into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(ForbiddenError(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<UnauthorizedError>().is_some() {
            return StatusCode::UNAUTHORIZED;
        }
        if self.0.downcast_ref::<ForbiddenError>().is_some() {
            return StatusCode::FORBIDDEN;
        }
        match self.0.downcast_ref::<UpstacError>() {
            Some(UpstacError::MissingRole { .. }) => StatusCode::FORBIDDEN,
            Some(e) if e.is_retryable() => StatusCode::CONFLICT,
            Some(e) if e.is_domain() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
