use serde::Serialize;

use super::{Post, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub author_id: i32,
    pub post_id: i32,
}

/// Comment joined with its author. `post` is only loaded when the comment is read on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}
