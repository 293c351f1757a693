use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use upstac_core::intake::IntakeService;
use upstac_core::query::QueryService;
use upstac_core::request::{CreateTestRequest, RequestFlow, TestRequest};
use upstac_core::types::Role;

use super::{blocking, payload, request_id};
use crate::auth::{require_any, CurrentUser};
use crate::error::AppError;
use crate::state::AppState;

const STAFF: &[Role] = &[Role::Tester, Role::Doctor, Role::Admin];

/// POST /api/test-requests: file a new request as the calling user.
pub async fn create(
    State(app): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateTestRequest>, JsonRejection>,
) -> Result<Json<TestRequest>, AppError> {
    let details = payload(body)?;
    let store = app.store.clone();
    let created = blocking(move || IntakeService::new(store.as_ref()).create(details, &user)).await?;
    Ok(Json(created))
}

/// GET /api/test-requests: requests filed by the calling user.
pub async fn mine(
    State(app): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TestRequest>>, AppError> {
    let store = app.store.clone();
    let list = blocking(move || QueryService::new(store.as_ref()).find_by_creator(&user)).await?;
    Ok(Json(list))
}

/// GET /api/test-requests/{id}: visible to its creator and to staff.
///
/// Anyone else gets 403 whether or not the id exists.
pub async fn get_request(
    State(app): State<AppState>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<TestRequest>, AppError> {
    let id = request_id(path)?;
    let store = app.store.clone();
    if user.has_any_role(STAFF) {
        let request = blocking(move || QueryService::new(store.as_ref()).get(id)).await?;
        return Ok(Json(request));
    }

    let username = user.username.clone();
    let own = blocking(move || QueryService::new(store.as_ref()).find_by_creator(&user)).await?;
    match own.into_iter().find(|r| r.id == id) {
        Some(request) => Ok(Json(request)),
        None => Err(AppError::forbidden(format!(
            "request {id} is not visible to '{username}'"
        ))),
    }
}

/// GET /api/test-requests/{id}/flow: transition history.
pub async fn flow(
    State(app): State<AppState>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Vec<RequestFlow>>, AppError> {
    require_any(&user, STAFF)?;
    let id = request_id(path)?;
    let store = app.store.clone();
    let history = blocking(move || QueryService::new(store.as_ref()).flow_history(id)).await?;
    Ok(Json(history))
}
