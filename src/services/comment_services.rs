// src/services/comment_services.rs
use std::sync::Arc;

use log::warn;

use crate::error::AppError;
use crate::models::{Comment, CommentRecord};
use crate::repositories::Datastore;

const ENTITY: &str = "Comment";

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Datastore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Any failure, including an unknown post or author, is a 400.
    pub async fn create_comment(&self, post_id: i32, content: &str, author_id: i32) -> Result<Comment, AppError> {
        self.store
            .create_comment(author_id, post_id, content)
            .await
            .map_err(|e| {
                warn!("comment on post {} by {} rejected: {}", post_id, author_id, e);
                AppError::from(e)
            })
    }

    pub async fn get_comment(&self, comment_id: i32) -> Result<Option<CommentRecord>, AppError> {
        self.store
            .find_comment(comment_id)
            .await
            .map_err(|e| AppError::from_datastore(e, ENTITY, comment_id))
    }

    pub async fn update_comment(&self, comment_id: i32, content: &str) -> Result<Comment, AppError> {
        self.store
            .update_comment(comment_id, content)
            .await
            .map_err(|e| AppError::from_datastore(e, ENTITY, comment_id))
    }

    pub async fn delete_comment(&self, comment_id: i32) -> Result<Comment, AppError> {
        self.store
            .delete_comment(comment_id)
            .await
            .map_err(|e| AppError::from_datastore(e, ENTITY, comment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{DbError, Fault, MemoryStore, PostChanges};

    async fn setup() -> (CommentService, Arc<MemoryStore>, i32, i32) {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("carol", "hash").await.unwrap();
        let post = store
            .create_post(
                user.id,
                &PostChanges {
                    title: "t".into(),
                    content: "c".into(),
                    tags: vec!["x".into()],
                },
            )
            .await
            .unwrap();
        (CommentService::new(store.clone()), store, user.id, post.post.id)
    }

    #[actix_web::test]
    async fn create_and_read_back_with_author_and_post() {
        let (svc, _, user_id, post_id) = setup().await;
        let comment = svc.create_comment(post_id, "hello", user_id).await.unwrap();

        let record = svc.get_comment(comment.id).await.unwrap().unwrap();
        assert_eq!(record.comment, comment);
        assert_eq!(record.author.username, "carol");
        assert_eq!(record.post.map(|p| p.id), Some(post_id));
    }

    #[actix_web::test]
    async fn comment_on_missing_post_is_400() {
        let (svc, _, user_id, _) = setup().await;
        let err = svc.create_comment(4242, "hello", user_id).await.unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[actix_web::test]
    async fn missing_comment_reads_as_none() {
        let (svc, _, _, _) = setup().await;
        assert!(svc.get_comment(999).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn update_and_delete_translate_not_found() {
        let (svc, _, _, _) = setup().await;
        assert_eq!(
            svc.update_comment(55, "x").await.unwrap_err(),
            AppError::new(404, "Comment with id 55 not found")
        );
        assert_eq!(
            svc.delete_comment(56).await.unwrap_err(),
            AppError::new(404, "Comment with id 56 not found")
        );
    }

    #[actix_web::test]
    async fn update_changes_content() {
        let (svc, _, user_id, post_id) = setup().await;
        let comment = svc.create_comment(post_id, "hello", user_id).await.unwrap();
        let updated = svc.update_comment(comment.id, "edited").await.unwrap();
        assert_eq!(updated.content, "edited");
        assert_eq!(updated.post_id, post_id);
    }

    #[actix_web::test]
    async fn other_failures_keep_their_message() {
        let (svc, store, _, _) = setup().await;
        store.fail_on(Fault::DeleteComment, DbError::new("too many connections"));
        assert_eq!(
            svc.delete_comment(1).await.unwrap_err(),
            AppError::new(400, "too many connections")
        );
    }
}
