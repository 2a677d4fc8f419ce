use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::auth::{SendOtpRequest, VerifyOtpRequest},
    entity::users::{ActiveModel, Column, Entity as Users},
    error::{AppError, AppResult},
    models::{Role, User},
    otp::OtpStore,
    response::{ApiResponse, Meta},
    services::user_service::user_from_entity,
    state::AppState,
};

pub async fn send_otp(
    otp: &OtpStore,
    payload: SendOtpRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let phone = payload.phone_number.trim();
    if phone.is_empty() {
        return Err(AppError::BadRequest("phoneNumber is required".into()));
    }

    let code = otp.issue(phone);
    // No SMS gateway: the log line is the delivery channel.
    tracing::info!(phone = %phone, otp = %code, "otp issued");

    Ok(ApiResponse::success(
        "OTP sent successfully",
        serde_json::json!({ "expiresInSecs": otp.ttl().as_secs() }),
        Some(Meta::empty()),
    ))
}

/// Check the OTP, then log the user in or register them on first contact.
pub async fn verify_otp(
    state: &AppState,
    payload: VerifyOtpRequest,
) -> AppResult<ApiResponse<User>> {
    let phone = payload.phone_number.trim().to_string();
    // Parse before verifying so a bad role doesn't use up the code.
    let role = match payload.role.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(role) => role.parse::<Role>().map_err(AppError::BadRequest)?,
        None => Role::Student,
    };

    if !state.otp.verify(&phone, payload.otp.trim()) {
        return Err(AppError::InvalidOtp);
    }

    let existing = Users::find()
        .filter(Column::PhoneNumber.eq(phone.as_str()))
        .one(&state.orm)
        .await?;

    if let Some(user) = existing {
        let user = user_from_entity(user)?;
        if user.role != role {
            return Err(AppError::RoleMismatch(format!(
                "Account exists as {}. Please login to the correct app.",
                user.role
            )));
        }
        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        return Ok(ApiResponse::success("Logged in", user, Some(Meta::empty())));
    }

    let registration = Registration::from_request(role, payload)?;
    let user = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(registration.name),
        phone_number: Set(phone),
        role: Set(role.as_str().into()),
        registration_number: Set(registration.registration_number),
        shop_name: Set(registration.shop_name),
        block: Set(registration.block),
        is_open: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, role = %role, "user registered");

    Ok(ApiResponse::success(
        "Registered",
        user_from_entity(user)?,
        Some(Meta::empty()),
    ))
}

struct Registration {
    name: String,
    registration_number: Option<String>,
    shop_name: Option<String>,
    block: Option<String>,
}

impl Registration {
    fn from_request(role: Role, payload: VerifyOtpRequest) -> AppResult<Self> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let name = present(payload.name);

        match role {
            Role::Vendor => match (name, present(payload.shop_name), present(payload.block)) {
                (Some(name), Some(shop_name), Some(block)) => Ok(Self {
                    name,
                    registration_number: None,
                    shop_name: Some(shop_name),
                    block: Some(block),
                }),
                _ => Err(AppError::ValidationFailed(
                    "Please complete your Vendor Profile (Shop Name & Block required).".into(),
                )),
            },
            Role::Student => match (name, present(payload.registration_number)) {
                (Some(name), Some(registration_number)) => Ok(Self {
                    name,
                    registration_number: Some(registration_number),
                    shop_name: None,
                    block: None,
                }),
                _ => Err(AppError::ValidationFailed(
                    "Account not found. Please Sign Up.".into(),
                )),
            },
        }
    }
}
