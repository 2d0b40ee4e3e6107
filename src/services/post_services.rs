// src/services/post_services.rs
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::AppError;
use crate::models::{Post, PostRecord};
use crate::repositories::{Datastore, PostChanges, WriteOp, WriteOutcome};

const ENTITY: &str = "Post";

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Datastore>,
}

impl PostService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn create_post(&self, changes: PostChanges, author_id: i32) -> Result<PostRecord, AppError> {
        self.store.create_post(author_id, &changes).await.map_err(|e| {
            warn!("create post for author {} failed: {}", author_id, e);
            AppError::from(e)
        })
    }

    /// `Ok(None)` when no post has this id; the caller decides how to report it.
    pub async fn get_post(&self, post_id: i32) -> Result<Option<PostRecord>, AppError> {
        self.store
            .find_post(post_id)
            .await
            .map_err(|e| AppError::from_datastore(e, ENTITY, post_id))
    }

    /// Query parameters are accepted but do not filter the result.
    pub async fn get_posts(&self, query: &HashMap<String, String>) -> Result<Vec<PostRecord>, AppError> {
        if !query.is_empty() {
            debug!("ignoring post query parameters: {:?}", query);
        }
        Ok(self.store.find_posts().await?)
    }

    /// Replaces the tag set and scalar fields in one transaction.
    pub async fn update_post(&self, post_id: i32, changes: PostChanges) -> Result<PostRecord, AppError> {
        let ops = vec![
            WriteOp::DeleteTagsOfPost { post_id },
            WriteOp::UpdatePost { post_id, changes },
        ];
        let outcomes = self.store.transaction(ops).await.map_err(|e| {
            warn!("update of post {} rolled back: {}", post_id, e);
            AppError::from_datastore(e, ENTITY, post_id)
        })?;

        match outcomes.into_iter().nth(1) {
            Some(WriteOutcome::Post(record)) => Ok(record),
            _ => Err(AppError::internal("post update returned no post")),
        }
    }

    pub async fn delete_post(&self, post_id: i32) -> Result<Post, AppError> {
        self.store
            .delete_post(post_id)
            .await
            .map_err(|e| AppError::from_datastore(e, ENTITY, post_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{DbError, Fault, MemoryStore};

    struct Fixture {
        svc: PostService,
        store: Arc<MemoryStore>,
        author_id: i32,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let author = store.create_user("alice", "hash").await.unwrap();
        Fixture {
            svc: PostService::new(store.clone()),
            store,
            author_id: author.id,
        }
    }

    fn changes(title: &str, tags: &[&str]) -> PostChanges {
        PostChanges {
            title: title.to_string(),
            content: "content".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[actix_web::test]
    async fn create_post_attaches_author_and_tags() {
        let f = fixture().await;
        let record = f.svc.create_post(changes("t", &["a", "b"]), f.author_id).await.unwrap();

        assert_eq!(record.author.id, f.author_id);
        assert_eq!(record.tag_names(), vec!["a", "b"]);
        assert!(record.tags.iter().all(|t| t.post_id == record.post.id));
    }

    #[actix_web::test]
    async fn create_post_with_unknown_author_is_400() {
        let f = fixture().await;
        let err = f.svc.create_post(changes("t", &["a"]), 999).await.unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[actix_web::test]
    async fn get_post_returns_stored_record_with_relations() {
        let f = fixture().await;
        let created = f.svc.create_post(changes("t", &["a"]), f.author_id).await.unwrap();
        let post_id = created.post.id;
        f.store.create_comment(f.author_id, post_id, "first").await.unwrap();
        f.store.create_image(post_id, "storage/pic.png").await.unwrap();

        let fetched = f.svc.get_post(post_id).await.unwrap().unwrap();

        assert_eq!(Some(fetched.clone()), f.store.find_post(post_id).await.unwrap());
        assert_eq!(fetched.author.username, "alice");
        assert_eq!(fetched.comments.len(), 1);
        assert_eq!(fetched.comments[0].author.id, f.author_id);
        assert_eq!(fetched.images[0].url, "storage/pic.png");
        assert_eq!(fetched.tag_names(), vec!["a"]);
    }

    #[actix_web::test]
    async fn get_post_returns_none_when_absent() {
        let f = fixture().await;
        assert_eq!(f.svc.get_post(12345).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn get_post_translates_thrown_not_found() {
        let f = fixture().await;
        f.store.fail_on(Fault::FindPost, DbError::not_found("No Post found"));
        let err = f.svc.get_post(3).await.unwrap_err();
        assert_eq!(err, AppError::new(404, "Post with id 3 not found"));
    }

    #[actix_web::test]
    async fn get_posts_ignores_query() {
        let f = fixture().await;
        f.svc.create_post(changes("one", &["a"]), f.author_id).await.unwrap();
        f.svc.create_post(changes("two", &["b"]), f.author_id).await.unwrap();

        let mut query = HashMap::new();
        query.insert("tag".to_string(), "a".to_string());
        let posts = f.svc.get_posts(&query).await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[actix_web::test]
    async fn update_post_replaces_tags() {
        let f = fixture().await;
        let created = f.svc.create_post(changes("t", &["a", "b"]), f.author_id).await.unwrap();
        let post_id = created.post.id;

        let updated = f.svc.update_post(post_id, changes("new title", &["c"])).await.unwrap();

        assert_eq!(updated.post.title, "new title");
        assert_eq!(updated.tag_names(), vec!["c"]);
        assert_eq!(f.store.tag_names(post_id), vec!["c"]);
    }

    #[actix_web::test]
    async fn update_post_is_atomic() {
        let f = fixture().await;
        let created = f.svc.create_post(changes("t", &["a", "b"]), f.author_id).await.unwrap();
        let post_id = created.post.id;
        let before = f.store.find_post(post_id).await.unwrap();

        f.store.fail_on(Fault::UpdatePost, DbError::new("value too long for column"));
        let err = f.svc.update_post(post_id, changes("new", &["z"])).await.unwrap_err();

        assert_eq!(err, AppError::new(400, "value too long for column"));
        assert_eq!(f.store.find_post(post_id).await.unwrap(), before);
        assert_eq!(f.store.tag_names(post_id), vec!["a", "b"]);
    }

    #[actix_web::test]
    async fn update_missing_post_is_404() {
        let f = fixture().await;
        let err = f.svc.update_post(77, changes("t", &["a"])).await.unwrap_err();
        assert_eq!(err, AppError::new(404, "Post with id 77 not found"));
    }

    #[actix_web::test]
    async fn delete_post_returns_deleted_row() {
        let f = fixture().await;
        let created = f.svc.create_post(changes("t", &["a"]), f.author_id).await.unwrap();
        let deleted = f.svc.delete_post(created.post.id).await.unwrap();
        assert_eq!(deleted, created.post);
        assert_eq!(f.svc.get_post(created.post.id).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn delete_post_not_found_code_is_404() {
        let f = fixture().await;
        f.store.fail_on(Fault::DeletePost, DbError::not_found("Record to delete does not exist."));
        let err = f.svc.delete_post(1).await.unwrap_err();
        assert_eq!(err, AppError::new(404, "Post with id 1 not found"));
    }

    #[actix_web::test]
    async fn delete_post_other_error_is_400_with_datastore_message() {
        let f = fixture().await;
        f.store.fail_on(Fault::DeletePost, DbError::new("deadlock detected"));
        let err = f.svc.delete_post(1).await.unwrap_err();
        assert_eq!(err, AppError::new(400, "deadlock detected"));
    }
}
