use serde::{Deserialize, Serialize};
use validator::Validate;

use super::auth_dtos::{to_user_dto, UserDto};
use crate::models::CommentRecord;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCommentIn {
    pub post_id: i32,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommentIn {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub author: UserDto,
    pub content: String,
}

pub fn to_comment_dto(record: &CommentRecord) -> CommentDto {
    CommentDto {
        id: record.comment.id,
        author: to_user_dto(&record.author),
        content: record.comment.content.clone(),
    }
}
