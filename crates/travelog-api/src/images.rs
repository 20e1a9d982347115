use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{error, warn};

use travelog_types::api::{DeleteImageQuery, DeleteImageResponse, UploadResponse};

use crate::AppState;
use crate::error::ApiError;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// POST /image-upload: multipart form with an `image` file part.
/// Stores the file and returns the URL it is served under.
pub async fn upload_image(
    State(state): State<AppState>,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        if let Some(content_type) = field.content_type() {
            if !content_type.starts_with("image/") {
                warn!("Rejected upload with content type {}", content_type);
                return Err(ApiError::Validation("Only image files are allowed".into()));
            }
        }

        let original_name = field.file_name().map(str::to_owned);
        let data = field.bytes().await?;
        if data.is_empty() {
            break;
        }

        let filename = state
            .images
            .save(original_name.as_deref(), &data)
            .await
            .map_err(|e| {
                error!("Failed to store image: {}", e);
                ApiError::Internal("Failed to store image".into())
            })?;

        let image_url = format!(
            "{}/uploads/{}",
            state.public_url.trim_end_matches('/'),
            filename
        );
        return Ok(Json(UploadResponse { image_url }));
    }

    Err(ApiError::Validation("No image uploaded".into()))
}

/// DELETE /delete-image?imageUrl=...
///
/// A missing file is reported as 200 with `error: true`, not as an HTTP error.
pub async fn delete_image(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<DeleteImageQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let image_url = query
        .image_url
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation("imageUrl parameter is required".into()))?;

    let deleted = state.images.delete(&image_url).await.map_err(|e| {
        error!("Failed to delete image {}: {}", image_url, e);
        ApiError::Internal("Failed to delete image".into())
    })?;

    let response = if deleted {
        DeleteImageResponse {
            error: false,
            message: "Image deleted successfully".into(),
        }
    } else {
        DeleteImageResponse {
            error: true,
            message: "Image not found".into(),
        }
    };
    Ok(Json(response))
}
