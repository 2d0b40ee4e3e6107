// src/handlers/post_handlers.rs
use std::collections::HashMap;

use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;

use crate::dtos::{to_post_dto, PostDto, PostIn};
use crate::error::AppError;
use crate::middleware::{AuthenticatedUser, ValidatedJson};
use crate::AppState;

#[get("")]
pub async fn get_posts(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    info!("Retrieving posts");
    let posts = state.posts.get_posts(&query).await?;
    let dtos: Vec<PostDto> = posts.iter().map(to_post_dto).collect();
    Ok(HttpResponse::Ok().json(dtos))
}

#[post("")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: ValidatedJson<PostIn>,
) -> Result<HttpResponse, AppError> {
    info!("Creating post for user: {}", user.user_id);
    let record = state
        .posts
        .create_post(body.into_inner().into(), user.user_id)
        .await?;
    Ok(HttpResponse::Created().json(record))
}

#[get("/{post_id}")]
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    info!("Retrieving post with id: {}", post_id);

    match state.posts.get_post(post_id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(to_post_dto(&record))),
        None => Err(AppError::entity_not_found("Post", post_id)),
    }
}

#[put("/{post_id}")]
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: ValidatedJson<PostIn>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    info!("Updating post with id: {}", post_id);
    let record = state.posts.update_post(post_id, body.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[delete("/{post_id}")]
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    info!("Deleting post with id: {}", post_id);
    let post = state.posts.delete_post(post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}
