pub mod memory_repo;
pub mod postgres_repo;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Comment, CommentRecord, Image, ImageRecord, Post, PostRecord, User};

pub use memory_repo::{Fault, MemoryStore};
pub use postgres_repo::PgStore;

/// Code carried by [`DbError`] when an update or delete matched no row.
pub const RECORD_NOT_FOUND: &str = "RECORD_NOT_FOUND";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DbError {
    pub code: Option<String>,
    pub message: String,
}

impl DbError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(RECORD_NOT_FOUND, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(RECORD_NOT_FOUND)
    }
}

/// Scalar fields and tag names written by post create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// One statement of a [`Datastore::transaction`] batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    DeleteTagsOfPost { post_id: i32 },
    UpdatePost { post_id: i32, changes: PostChanges },
}

/// Result of a [`WriteOp`], in the same position as the op in the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Deleted(u64),
    Post(PostRecord),
}

#[async_trait]
pub trait Datastore: Send + Sync {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DbError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Inserts the post and one tag per name as a single unit.
    async fn create_post(&self, author_id: i32, changes: &PostChanges) -> Result<PostRecord, DbError>;
    async fn find_post(&self, post_id: i32) -> Result<Option<PostRecord>, DbError>;
    async fn find_posts(&self) -> Result<Vec<PostRecord>, DbError>;
    async fn delete_post(&self, post_id: i32) -> Result<Post, DbError>;

    async fn create_comment(&self, author_id: i32, post_id: i32, content: &str) -> Result<Comment, DbError>;
    async fn find_comment(&self, comment_id: i32) -> Result<Option<CommentRecord>, DbError>;
    async fn update_comment(&self, comment_id: i32, content: &str) -> Result<Comment, DbError>;
    async fn delete_comment(&self, comment_id: i32) -> Result<Comment, DbError>;

    async fn create_image(&self, post_id: i32, url: &str) -> Result<ImageRecord, DbError>;
    async fn delete_image(&self, image_id: i32) -> Result<Image, DbError>;

    /// Runs every op in order; either all of them commit or none does.
    async fn transaction(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>, DbError>;
}
