pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use std::path::PathBuf;
use std::sync::Arc;

use crate::repositories::Datastore;
use crate::services::{AuthService, CommentService, ImageService, JwtKeys, PostService};

/// Shared by every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
    pub comments: CommentService,
    pub images: ImageService,
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Every service talks to the same datastore handle.
    pub fn new(store: Arc<dyn Datastore>, keys: JwtKeys, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            auth: AuthService::new(store.clone(), keys),
            posts: PostService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            images: ImageService::new(store),
            upload_dir: upload_dir.into(),
        }
    }
}
