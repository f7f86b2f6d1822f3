//! The two-stage handshake endpoints: register, login (password stage) and
//! verify-otp (code stage).

use axum::{extract::State, http::StatusCode, Json};
use vaultix_core::error::AppError;

use crate::{
    dtos::auth::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, VerifyOtpRequest,
        VerifyOtpResponse,
    },
    utils::ValidatedJson,
    AppState,
};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    state.auth.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registered successfully".to_string(),
        }),
    ))
}

/// POST /api/auth/login
///
/// Success does not authenticate: the returned token is only good for the
/// verify-otp call.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let outcome = state.auth.login(req).await?;
    Ok(Json(LoginResponse {
        otp_required: true,
        token: outcome.token,
        demo_otp: outcome.demo_code,
        role: outcome.role,
    }))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    let token = state.auth.verify_otp(&req.token, &req.otp).await?;
    Ok(Json(VerifyOtpResponse { token }))
}
