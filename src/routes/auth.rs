use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::auth::{SendOtpRequest, VerifyOtpRequest},
    error::AppResult,
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
}

#[utoipa::path(
    post,
    path = "/auth/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP generated", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Missing phone number")
    ),
    tag = "Auth"
)]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::send_otp(&state.otp, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Logged in or registered", body = ApiResponse<User>),
        (status = 401, description = "Invalid or expired OTP"),
        (status = 403, description = "Account registered with another role"),
        (status = 422, description = "Registration details missing")
    ),
    tag = "Auth"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::verify_otp(&state, payload).await?;
    Ok(Json(resp))
}
