// src/services/image_services.rs
use std::sync::Arc;

use log::warn;

use crate::error::AppError;
use crate::models::{Image, ImageRecord};
use crate::repositories::Datastore;

#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn Datastore>,
}

impl ImageService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn create_image(&self, url: &str, post_id: i32) -> Result<ImageRecord, AppError> {
        self.store.create_image(post_id, url).await.map_err(|e| {
            warn!("attaching image to post {} failed: {}", post_id, e);
            AppError::from(e)
        })
    }

    pub async fn delete_image(&self, image_id: i32) -> Result<Image, AppError> {
        self.store
            .delete_image(image_id)
            .await
            .map_err(|e| AppError::from_datastore(e, "Image", image_id))
    }
}
