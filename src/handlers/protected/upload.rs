// handlers/protected/upload.rs - POST /api/upload-image
//
// Image upload used by the content editor. Responds with the shape the
// editor expects: {"location": "<public url>"}.

use axum::{
    extract::{Multipart, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use super::multipart_error;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;
use crate::storage::{upload_image as store_image, ImageUpload, UploadError, UploadTarget};

pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or(UploadError::Empty)?;
    let location = store_image(
        state.backend.as_ref(),
        &user.access_token,
        &state.config.storage,
        UploadTarget::Editor,
        upload,
    )
    .await?;

    Ok(Json(json!({ "location": location })))
}
