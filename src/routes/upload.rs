use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};

use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    response::ApiResponse,
    services::upload_service::{self, MAX_UPLOAD_BYTES, UploadResponse},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        // Leave room for multipart framing around the file itself.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}

/// Multipart body accepted by the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored image URL", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Missing file or not an image"),
    ),
    tag = "Upload"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let resp = upload_service::save_image(
            &state.upload_dir,
            file_name.as_deref(),
            content_type.as_deref(),
            &data,
        )
        .await?;
        return Ok(Json(resp));
    }

    Err(AppError::BadRequest("No file provided".into()))
}
