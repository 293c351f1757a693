use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use upstac_core::query::QueryService;
use upstac_core::request::{LabResultInput, TestRequest};
use upstac_core::types::{RequestStatus, Role};
use upstac_core::update::UpdateService;

use super::{blocking, payload, request_id};
use crate::auth::{require, CurrentUser};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/lab-requests/to-be-tested: requests waiting for a tester.
pub async fn to_be_tested(
    State(app): State<AppState>,
    CurrentUser(tester): CurrentUser,
) -> Result<Json<Vec<TestRequest>>, AppError> {
    require(&tester, Role::Tester)?;
    let store = app.store.clone();
    let list = blocking(move || {
        QueryService::new(store.as_ref()).find_by_status(RequestStatus::Initiated)
    })
    .await?;
    Ok(Json(list))
}

/// GET /api/lab-requests: requests assigned to the calling tester.
pub async fn mine(
    State(app): State<AppState>,
    CurrentUser(tester): CurrentUser,
) -> Result<Json<Vec<TestRequest>>, AppError> {
    require(&tester, Role::Tester)?;
    let store = app.store.clone();
    let list = blocking(move || QueryService::new(store.as_ref()).find_by_tester(&tester)).await?;
    Ok(Json(list))
}

/// PUT /api/lab-requests/assign/{id}: take a request for lab testing.
pub async fn assign(
    State(app): State<AppState>,
    CurrentUser(tester): CurrentUser,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<TestRequest>, AppError> {
    require(&tester, Role::Tester)?;
    let id = request_id(path)?;
    let store = app.store.clone();
    let updated =
        blocking(move || UpdateService::new(store.as_ref()).assign_for_lab_test(id, &tester))
            .await?;
    Ok(Json(updated))
}

/// PUT /api/lab-requests/update/{id}: submit the lab result.
pub async fn update(
    State(app): State<AppState>,
    CurrentUser(tester): CurrentUser,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<LabResultInput>, JsonRejection>,
) -> Result<Json<TestRequest>, AppError> {
    require(&tester, Role::Tester)?;
    let id = request_id(path)?;
    let input = payload(body)?;
    let store = app.store.clone();
    let updated =
        blocking(move || UpdateService::new(store.as_ref()).update_lab_test(id, input, &tester))
            .await?;
    Ok(Json(updated))
}
