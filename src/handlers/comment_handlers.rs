use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;

use crate::dtos::{to_comment_dto, CreateCommentIn, UpdateCommentIn};
use crate::error::AppError;
use crate::middleware::{AuthenticatedUser, ValidatedJson};
use crate::AppState;

#[post("")]
pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: ValidatedJson<CreateCommentIn>,
) -> Result<HttpResponse, AppError> {
    info!("Creating comment on post {} for user: {}", body.post_id, user.user_id);
    let comment = state
        .comments
        .create_comment(body.post_id, &body.content, user.user_id)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[get("/{comment_id}")]
pub async fn get_comment(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let comment_id = path.into_inner();
    info!("Retrieving comment with id: {}", comment_id);

    match state.comments.get_comment(comment_id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(to_comment_dto(&record))),
        None => Err(AppError::entity_not_found("Comment", comment_id)),
    }
}

#[put("/{comment_id}")]
pub async fn update_comment(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: ValidatedJson<UpdateCommentIn>,
) -> Result<HttpResponse, AppError> {
    let comment_id = path.into_inner();
    info!("Updating comment with id: {}", comment_id);
    let comment = state.comments.update_comment(comment_id, &body.content).await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let comment_id = path.into_inner();
    info!("Deleting comment with id: {}", comment_id);
    let comment = state.comments.delete_comment(comment_id).await?;
    Ok(HttpResponse::Ok().json(comment))
}
