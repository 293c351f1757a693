pub mod consultations;
pub mod lab_requests;
pub mod test_requests;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;

use crate::error::AppError;

/// Run synchronous core work off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> upstac_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let value = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(value)
}

/// Unwrap a JSON body, reporting malformed payloads as validation failures (400).
pub(crate) fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
    }
}

/// Unwrap a `{id}` path segment, reporting non-numeric ids the same way.
pub(crate) fn request_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
    }
}
