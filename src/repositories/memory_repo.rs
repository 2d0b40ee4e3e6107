// src/repositories/memory_repo.rs - in-process datastore, used by the test suites
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{Datastore, DbError, PostChanges, WriteOp, WriteOutcome};
use crate::models::{Comment, CommentRecord, Image, ImageRecord, Post, PostRecord, Tag, User};

/// Operation an injected failure is armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    CreateUser,
    FindUser,
    CreatePost,
    FindPost,
    FindPosts,
    DeletePost,
    CreateComment,
    FindComment,
    UpdateComment,
    DeleteComment,
    CreateImage,
    DeleteImage,
    /// First step of a post update transaction.
    DeleteTags,
    /// Second step of a post update transaction.
    UpdatePost,
}

impl From<&WriteOp> for Fault {
    fn from(op: &WriteOp) -> Self {
        match op {
            WriteOp::DeleteTagsOfPost { .. } => Fault::DeleteTags,
            WriteOp::UpdatePost { .. } => Fault::UpdatePost,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    tags: Vec<Tag>,
    images: Vec<Image>,
    comments: Vec<Comment>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, id: i32) -> Result<&User, DbError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| DbError::new(format!("Foreign key constraint failed: user {} does not exist", id)))
    }

    fn post(&self, id: i32) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn comment_record(&self, comment: &Comment, with_post: bool) -> Result<CommentRecord, DbError> {
        Ok(CommentRecord {
            comment: comment.clone(),
            author: self.user(comment.author_id)?.clone(),
            post: if with_post { self.post(comment.post_id).cloned() } else { None },
        })
    }

    fn post_record(&self, post: &Post) -> Result<PostRecord, DbError> {
        let comments = self
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .map(|c| self.comment_record(c, false))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PostRecord {
            post: post.clone(),
            author: self.user(post.author_id)?.clone(),
            tags: self.tags.iter().filter(|t| t.post_id == post.id).cloned().collect(),
            images: self.images.iter().filter(|i| i.post_id == post.id).cloned().collect(),
            comments,
        })
    }

    fn insert_tags(&mut self, post_id: i32, names: &[String]) {
        for name in names {
            let id = self.next_id();
            self.tags.push(Tag {
                id,
                name: name.clone(),
                post_id,
            });
        }
    }

    fn apply(&mut self, op: &WriteOp) -> Result<WriteOutcome, DbError> {
        match op {
            WriteOp::DeleteTagsOfPost { post_id } => {
                let before = self.tags.len();
                self.tags.retain(|t| t.post_id != *post_id);
                Ok(WriteOutcome::Deleted((before - self.tags.len()) as u64))
            }
            WriteOp::UpdatePost { post_id, changes } => {
                let post = self
                    .posts
                    .iter_mut()
                    .find(|p| p.id == *post_id)
                    .ok_or_else(|| DbError::not_found("Record to update not found."))?;
                post.title = changes.title.clone();
                post.content = changes.content.clone();
                let updated = post.clone();
                self.insert_tags(*post_id, &changes.tags);
                Ok(WriteOutcome::Post(self.post_record(&updated)?))
            }
        }
    }
}

/// A [`Datastore`] over plain vectors behind a mutex.
///
/// Transactions run against a copy of the tables that only replaces the
/// live copy when every op succeeded. [`MemoryStore::fail_on`] makes the
/// next call of one operation fail with the given error.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fault: Mutex<Option<(Fault, DbError)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, at: Fault, err: DbError) {
        *lock(&self.fault) = Some((at, err));
    }

    pub fn tag_names(&self, post_id: i32) -> Vec<String> {
        lock(&self.tables)
            .tags
            .iter()
            .filter(|t| t.post_id == post_id)
            .map(|t| t.name.clone())
            .collect()
    }

    fn check(&self, at: Fault) -> Result<(), DbError> {
        let mut fault = lock(&self.fault);
        if matches!(fault.as_ref(), Some((armed, _)) if *armed == at) {
            if let Some((_, err)) = fault.take() {
                return Err(err);
            }
        }
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DbError> {
        self.check(Fault::CreateUser)?;
        let mut t = lock(&self.tables);
        if t.users.iter().any(|u| u.username == username) {
            return Err(DbError::with_code(
                "UNIQUE_VIOLATION",
                "Unique constraint failed on the fields: (`username`)",
            ));
        }
        let user = User {
            id: t.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        self.check(Fault::FindUser)?;
        Ok(lock(&self.tables).users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_post(&self, author_id: i32, changes: &PostChanges) -> Result<PostRecord, DbError> {
        self.check(Fault::CreatePost)?;
        let mut t = lock(&self.tables);
        t.user(author_id)?;
        let post = Post {
            id: t.next_id(),
            title: changes.title.clone(),
            content: changes.content.clone(),
            created_at: Utc::now(),
            author_id,
        };
        t.posts.push(post.clone());
        t.insert_tags(post.id, &changes.tags);
        t.post_record(&post)
    }

    async fn find_post(&self, post_id: i32) -> Result<Option<PostRecord>, DbError> {
        self.check(Fault::FindPost)?;
        let t = lock(&self.tables);
        t.post(post_id).map(|p| t.post_record(p)).transpose()
    }

    async fn find_posts(&self) -> Result<Vec<PostRecord>, DbError> {
        self.check(Fault::FindPosts)?;
        let t = lock(&self.tables);
        t.posts.iter().map(|p| t.post_record(p)).collect()
    }

    async fn delete_post(&self, post_id: i32) -> Result<Post, DbError> {
        self.check(Fault::DeletePost)?;
        let mut t = lock(&self.tables);
        let idx = t
            .posts
            .iter()
            .position(|p| p.id == post_id)
            .ok_or_else(|| DbError::not_found("Record to delete does not exist."))?;
        let post = t.posts.remove(idx);
        t.tags.retain(|x| x.post_id != post_id);
        t.images.retain(|x| x.post_id != post_id);
        t.comments.retain(|x| x.post_id != post_id);
        Ok(post)
    }

    async fn create_comment(&self, author_id: i32, post_id: i32, content: &str) -> Result<Comment, DbError> {
        self.check(Fault::CreateComment)?;
        let mut t = lock(&self.tables);
        t.user(author_id)?;
        if t.post(post_id).is_none() {
            return Err(DbError::new(format!(
                "Foreign key constraint failed: post {} does not exist",
                post_id
            )));
        }
        let comment = Comment {
            id: t.next_id(),
            content: content.to_string(),
            author_id,
            post_id,
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, comment_id: i32) -> Result<Option<CommentRecord>, DbError> {
        self.check(Fault::FindComment)?;
        let t = lock(&self.tables);
        t.comments
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| t.comment_record(c, true))
            .transpose()
    }

    async fn update_comment(&self, comment_id: i32, content: &str) -> Result<Comment, DbError> {
        self.check(Fault::UpdateComment)?;
        let mut t = lock(&self.tables);
        let comment = t
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| DbError::not_found("Record to update not found."))?;
        comment.content = content.to_string();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: i32) -> Result<Comment, DbError> {
        self.check(Fault::DeleteComment)?;
        let mut t = lock(&self.tables);
        let idx = t
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| DbError::not_found("Record to delete does not exist."))?;
        Ok(t.comments.remove(idx))
    }

    async fn create_image(&self, post_id: i32, url: &str) -> Result<ImageRecord, DbError> {
        self.check(Fault::CreateImage)?;
        let mut t = lock(&self.tables);
        let post = t
            .post(post_id)
            .cloned()
            .ok_or_else(|| DbError::new(format!("Foreign key constraint failed: post {} does not exist", post_id)))?;
        let image = Image {
            id: t.next_id(),
            url: url.to_string(),
            post_id,
        };
        t.images.push(image.clone());
        Ok(ImageRecord { image, post })
    }

    async fn delete_image(&self, image_id: i32) -> Result<Image, DbError> {
        self.check(Fault::DeleteImage)?;
        let mut t = lock(&self.tables);
        let idx = t
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or_else(|| DbError::not_found("Record to delete does not exist."))?;
        Ok(t.images.remove(idx))
    }

    async fn transaction(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>, DbError> {
        let mut live = lock(&self.tables);
        let mut staged = live.clone();
        let mut outcomes = Vec::with_capacity(ops.len());
        for op in &ops {
            self.check(Fault::from(op))?;
            outcomes.push(staged.apply(op)?);
        }
        *live = staged;
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(tags: &[&str]) -> PostChanges {
        PostChanges {
            title: "t".into(),
            content: "c".into(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[actix_web::test]
    async fn failed_transaction_leaves_tables_untouched() {
        let store = MemoryStore::new();
        let user = store.create_user("alice", "hash").await.unwrap();
        let post = store.create_post(user.id, &changes(&["a", "b"])).await.unwrap();

        store.fail_on(Fault::UpdatePost, DbError::new("boom"));
        let err = store
            .transaction(vec![
                WriteOp::DeleteTagsOfPost { post_id: post.post.id },
                WriteOp::UpdatePost { post_id: post.post.id, changes: changes(&["z"]) },
            ])
            .await
            .unwrap_err();

        assert_eq!(err, DbError::new("boom"));
        assert_eq!(store.tag_names(post.post.id), vec!["a", "b"]);
    }

    #[actix_web::test]
    async fn update_of_missing_post_reports_not_found() {
        let store = MemoryStore::new();
        let err = store
            .transaction(vec![WriteOp::UpdatePost { post_id: 42, changes: changes(&["x"]) }])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[actix_web::test]
    async fn deleting_a_post_cascades() {
        let store = MemoryStore::new();
        let user = store.create_user("alice", "hash").await.unwrap();
        let post = store.create_post(user.id, &changes(&["a"])).await.unwrap();
        let comment = store.create_comment(user.id, post.post.id, "hi").await.unwrap();
        store.create_image(post.post.id, "storage/x.png").await.unwrap();

        store.delete_post(post.post.id).await.unwrap();

        assert!(store.tag_names(post.post.id).is_empty());
        assert!(store.find_comment(comment.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn duplicate_username_is_a_plain_datastore_error() {
        let store = MemoryStore::new();
        store.create_user("alice", "h").await.unwrap();
        let err = store.create_user("alice", "h").await.unwrap_err();
        assert!(!err.is_not_found());
    }
}
