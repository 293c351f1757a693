use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use upstac_core::query::QueryService;
use upstac_core::request::{ConsultationInput, TestRequest};
use upstac_core::types::{RequestStatus, Role};
use upstac_core::update::UpdateService;

use super::{blocking, payload, request_id};
use crate::auth::{require, CurrentUser};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/consultations/in-queue: lab-complete requests waiting for a doctor.
pub async fn in_queue(
    State(app): State<AppState>,
    CurrentUser(doctor): CurrentUser,
) -> Result<Json<Vec<TestRequest>>, AppError> {
    require(&doctor, Role::Doctor)?;
    let store = app.store.clone();
    let list = blocking(move || {
        QueryService::new(store.as_ref()).find_by_status(RequestStatus::LabTestCompleted)
    })
    .await?;
    Ok(Json(list))
}

/// GET /api/consultations: requests assigned to the calling doctor.
pub async fn mine(
    State(app): State<AppState>,
    CurrentUser(doctor): CurrentUser,
) -> Result<Json<Vec<TestRequest>>, AppError> {
    require(&doctor, Role::Doctor)?;
    let store = app.store.clone();
    let list = blocking(move || QueryService::new(store.as_ref()).find_by_doctor(&doctor)).await?;
    Ok(Json(list))
}

/// PUT /api/consultations/assign/{id}
pub async fn assign(
    State(app): State<AppState>,
    CurrentUser(doctor): CurrentUser,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<TestRequest>, AppError> {
    require(&doctor, Role::Doctor)?;
    let id = request_id(path)?;
    let store = app.store.clone();
    let updated =
        blocking(move || UpdateService::new(store.as_ref()).assign_for_consultation(id, &doctor))
            .await?;
    Ok(Json(updated))
}

/// PUT /api/consultations/update/{id}: record the doctor's suggestion.
pub async fn update(
    State(app): State<AppState>,
    CurrentUser(doctor): CurrentUser,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<ConsultationInput>, JsonRejection>,
) -> Result<Json<TestRequest>, AppError> {
    require(&doctor, Role::Doctor)?;
    let id = request_id(path)?;
    let input = payload(body)?;
    let store = app.store.clone();
    let updated = blocking(move || {
        UpdateService::new(store.as_ref()).update_consultation(id, input, &doctor)
    })
    .await?;
    Ok(Json(updated))
}
