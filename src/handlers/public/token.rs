use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::api::{LoginDto, TokenResponse};
use crate::auth::generate_jwt;
use crate::database::UnitOfWork;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::server::AppState;
use crate::services::UserService;

const TOKEN_FAILED: &str = "Token failed to generate";
const BAD_CREDENTIALS: &str = "Please enter Valid Username and Password.";

/// POST /api/token/create
///
/// Exchanges a username and password for a bearer token. Bad credentials are
/// not an HTTP error: the envelope comes back 200 with `success: false` and a
/// `responseMessage`.
pub async fn token_create(
    State(state): State<AppState>,
    payload: Result<Json<LoginDto>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Ok(Json(request)) = payload else {
        return Err(ApiError::bad_request(TOKEN_FAILED));
    };
    if request.validate().is_err() {
        return Err(ApiError::bad_request(TOKEN_FAILED));
    }

    let mut uow = UnitOfWork::begin(&state.db).await?;
    let login = UserService::new(&uow).login(&request).await;
    uow.dispose().await;

    let Some(user) = login? else {
        warn!("Token refused for '{}'", request.username);
        let body = json!({ "responseMessage": BAD_CREDENTIALS });
        return Ok(ApiResponse::refused(BAD_CREDENTIALS, body).into_response());
    };

    let (access_token, expiry) = generate_jwt(&state.config.security, user.user_id, &user.username)?;
    info!("Issued token for '{}'", user.username);

    let body = TokenResponse {
        access_token,
        expiry,
        response: user,
    };
    Ok(ApiResponse::success("Token generated successfully.", body).into_response())
}
