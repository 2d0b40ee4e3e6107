use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CommentRecord, Image, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub post_id: i32,
}

/// A post with every relation loaded: author, tags, images and comments (each with its author).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
    pub tags: Vec<Tag>,
    pub images: Vec<Image>,
    pub comments: Vec<CommentRecord>,
}

impl PostRecord {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}
