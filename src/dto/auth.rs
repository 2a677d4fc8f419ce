use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub phone_number: String,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp: String,
    /// `STUDENT` or `VENDOR`, case-insensitive. Defaults to `STUDENT`.
    pub role: Option<String>,
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub shop_name: Option<String>,
    pub block: Option<String>,
}
