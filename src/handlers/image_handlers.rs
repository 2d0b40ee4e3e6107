// src/handlers/image_handlers.rs - multipart image upload onto a post
use std::path::Path;

use actix_multipart::{Field, Multipart};
use actix_web::{delete, post, web, HttpResponse};
use futures::StreamExt;
use log::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

const IMAGE_FIELD: &str = "image";

/// POST /posts/{post_id}/images
#[post("/{post_id}/images")]
pub async fn upload_image(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    info!("Uploading image for post with id: {}", post_id);

    if state.posts.get_post(post_id).await?.is_none() {
        return Err(AppError::entity_not_found("Post", post_id));
    }

    let mut upload = None;
    while let Some(field) = payload.next().await {
        let field = field.map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
        if field.name() == Some(IMAGE_FIELD) {
            upload = Some(read_image(field).await?);
            break;
        }
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::validation("image file is required"))?;

    tokio::fs::create_dir_all(&state.upload_dir).await.map_err(|e| {
        error!("Failed to create upload directory: {}", e);
        AppError::internal("Failed to prepare file storage")
    })?;

    let file_path = state
        .upload_dir
        .join(format!("{}-{}", Uuid::new_v4(), file_name));
    tokio::fs::write(&file_path, &bytes).await.map_err(|e| {
        error!("Failed to save image {}: {}", file_path.display(), e);
        AppError::internal("Failed to save image")
    })?;

    let url = file_path.to_string_lossy().into_owned();
    match state.images.create_image(&url, post_id).await {
        Ok(record) => Ok(HttpResponse::Created().json(record)),
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&file_path).await {
                warn!("Could not remove orphaned upload {}: {}", url, rm);
            }
            Err(e)
        }
    }
}

/// Reads the whole field, keeping only the final path component of the client file name.
async fn read_image(mut field: Field) -> Result<(String, Vec<u8>), AppError> {
    let is_image = field
        .content_type()
        .map(|ct| ct.type_() == mime::IMAGE)
        .unwrap_or(false);
    if !is_image {
        return Err(AppError::validation(
            "Invalid file type. Only image uploads are allowed.",
        ));
    }

    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| AppError::validation(format!("Image read error: {}", e)))?;
        bytes.extend_from_slice(&data);
    }
    Ok((file_name, bytes))
}

/// DELETE /posts/{post_id}/images/{image_id}
#[delete("/{post_id}/images/{image_id}")]
pub async fn delete_image(
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (post_id, image_id) = path.into_inner();
    info!("Deleting image {} of post {}", image_id, post_id);
    let image = state.images.delete_image(image_id).await?;
    Ok(HttpResponse::Ok().json(image))
}
