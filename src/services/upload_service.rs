use std::path::Path;

use serde::Serialize;
use tokio::fs;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
};

/// Largest accepted upload (5MB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Public prefix the upload directory is served under.
pub const UPLOADS_PREFIX: &str = "/uploads";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

/// Random file name that keeps the original extension, e.g. `photo.PNG` →
/// `<uuid>.PNG`.
pub fn stored_file_name(original: Option<&str>) -> String {
    let extension = original
        .and_then(|name| name.rfind('.').map(|idx| &name[idx..]))
        .filter(|ext| ext.len() > 1 && !ext.contains(['/', '\\']))
        .unwrap_or("");
    format!("{}{}", Uuid::new_v4(), extension)
}

pub async fn save_image(
    upload_dir: &Path,
    original_name: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> AppResult<ApiResponse<UploadResponse>> {
    if data.is_empty() {
        return Err(AppError::BadRequest("No file provided".into()));
    }
    if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return Err(AppError::BadRequest("Only image files are allowed".into()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {}MB",
            MAX_UPLOAD_BYTES / 1024 / 1024
        )));
    }

    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}")))?;

    let file_name = stored_file_name(original_name);
    fs::write(upload_dir.join(&file_name), data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to upload file: {e}")))?;

    tracing::info!(file = %file_name, size = data.len(), "image uploaded");

    Ok(ApiResponse::success(
        "Uploaded",
        UploadResponse {
            url: format!("{UPLOADS_PREFIX}/{file_name}"),
        },
        Some(Meta::empty()),
    ))
}
