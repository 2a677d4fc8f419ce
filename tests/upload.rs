use campus_crave_api::{
    error::AppError,
    services::upload_service::{UPLOADS_PREFIX, save_image, stored_file_name},
};

#[test]
fn stored_name_keeps_extension() {
    let name = stored_file_name(Some("photo.PNG"));
    assert!(name.ends_with(".PNG"));
    assert_eq!(name.len(), 36 + 4);
}

#[test]
fn stored_name_without_extension() {
    assert_eq!(stored_file_name(Some("photo")).len(), 36);
    assert_eq!(stored_file_name(None).len(), 36);
    assert_eq!(stored_file_name(Some("photo.")).len(), 36);
}

#[tokio::test]
async fn rejects_empty_and_non_image_uploads() {
    let dir = std::env::temp_dir().join(format!("crave-upload-{}", uuid::Uuid::new_v4()));

    let empty = save_image(&dir, Some("a.png"), Some("image/png"), &[]).await;
    assert!(matches!(empty, Err(AppError::BadRequest(msg)) if msg == "No file provided"));

    let text = save_image(&dir, Some("a.txt"), Some("text/plain"), b"hello").await;
    assert!(matches!(text, Err(AppError::BadRequest(msg)) if msg == "Only image files are allowed"));

    let untyped = save_image(&dir, Some("a.png"), None, b"hello").await;
    assert!(matches!(untyped, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn stores_image_under_uploads_prefix() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("crave-upload-{}", uuid::Uuid::new_v4()));

    let resp = save_image(&dir, Some("cake.jpg"), Some("image/jpeg"), b"\xFF\xD8\xFF").await?;
    let url = resp.data.expect("upload data").url;
    assert!(url.starts_with(&format!("{UPLOADS_PREFIX}/")));
    assert!(url.ends_with(".jpg"));

    let file_name = url.trim_start_matches(&format!("{UPLOADS_PREFIX}/"));
    let stored = tokio::fs::read(dir.join(file_name)).await?;
    assert_eq!(stored, b"\xFF\xD8\xFF");

    tokio::fs::remove_dir_all(&dir).await?;
    Ok(())
}
