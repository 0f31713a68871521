use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use validator::Validate;

use crate::api::{EmployeeDto, ShortListDto};
use crate::database::UnitOfWork;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::EmployeeService;

/// Unwrap and validate a JSON body before any storage access
fn validated(payload: Result<Json<EmployeeDto>, JsonRejection>) -> Result<EmployeeDto, ApiError> {
    let Json(dto) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    dto.validate()?;
    Ok(dto)
}

/// Read the numeric `:id`, keeping a bad id inside the envelope
fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    let Path(id) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(id)
}

/// POST /api/employees
pub async fn employee_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EmployeeDto>, JsonRejection>,
) -> ApiResult<Option<EmployeeDto>> {
    let dto = validated(payload)?;

    let mut uow = UnitOfWork::begin(&state.db).await?;
    let result = EmployeeService::new(&uow, user.current_user()).add(Some(dto)).await;
    uow.dispose().await;

    Ok(ApiResponse::success("Employee added successfully.", result?))
}

/// GET /api/employees
pub async fn employee_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<EmployeeDto>> {
    let mut uow = UnitOfWork::begin(&state.db).await?;
    let result = EmployeeService::new(&uow, user.current_user()).list().await;
    uow.dispose().await;

    Ok(ApiResponse::success("Employees Found.", result?))
}

/// GET /api/employees/shortlist
pub async fn employee_short_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<ShortListDto>> {
    let mut uow = UnitOfWork::begin(&state.db).await?;
    let result = EmployeeService::new(&uow, user.current_user()).short_list().await;
    uow.dispose().await;

    Ok(ApiResponse::success("Employees Found.", result?))
}

/// GET /api/employees/:id
pub async fn employee_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Option<EmployeeDto>> {
    let id = path_id(path)?;
    let mut uow = UnitOfWork::begin(&state.db).await?;
    let result = EmployeeService::new(&uow, user.current_user()).get_by_id(id).await;
    uow.dispose().await;

    Ok(match result? {
        Some(employee) => ApiResponse::success("Employee Found.", Some(employee)),
        None => ApiResponse::not_found("Employee not found.", None),
    })
}

/// PUT /api/employees/:id. The path id wins over any id in the body.
pub async fn employee_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<EmployeeDto>, JsonRejection>,
) -> ApiResult<Option<EmployeeDto>> {
    let id = path_id(path)?;
    let mut dto = validated(payload)?;
    dto.id = id;

    let mut uow = UnitOfWork::begin(&state.db).await?;
    let result = EmployeeService::new(&uow, user.current_user()).update(dto).await;
    uow.dispose().await;

    Ok(match result? {
        Some(employee) => ApiResponse::success("Employee updated successfully.", Some(employee)),
        None => ApiResponse::not_found("Failed to update. Employee not found.", None),
    })
}

/// DELETE /api/employees/:id
pub async fn employee_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<bool> {
    let id = path_id(path)?;
    let mut uow = UnitOfWork::begin(&state.db).await?;
    let result = EmployeeService::new(&uow, user.current_user()).delete(id).await;
    uow.dispose().await;

    Ok(if result? {
        ApiResponse::success("Employee deleted successfully.", true)
    } else {
        ApiResponse::not_found("Failed to delete. Employee not found.", false)
    })
}
