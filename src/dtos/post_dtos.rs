use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::auth_dtos::{to_user_dto, UserDto};
use super::comment_dtos::{to_comment_dto, CommentDto};
use crate::models::PostRecord;
use crate::repositories::PostChanges;

/// Body of post create and update. Tags replace the post's whole tag set.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PostIn {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "tags must contain at least 1 item"))]
    pub tags: Vec<String>,
}

impl From<PostIn> for PostChanges {
    fn from(body: PostIn) -> Self {
        PostChanges {
            title: body.title,
            content: body.content,
            tags: body.tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub author: UserDto,
    pub comments: Vec<CommentDto>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub fn to_post_dto(record: &PostRecord) -> PostDto {
    PostDto {
        id: record.post.id,
        title: record.post.title.clone(),
        author: to_user_dto(&record.author),
        comments: record.comments.iter().map(to_comment_dto).collect(),
        tags: record.tags.iter().map(|t| t.name.clone()).collect(),
        images: record.images.iter().map(|i| i.url.clone()).collect(),
        content: record.post.content.clone(),
        created_at: record.post.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, CommentRecord, Image, Post, Tag, User};

    fn user(id: i32, name: &str) -> User {
        User {
            id,
            username: name.into(),
            password: "hash".into(),
        }
    }

    #[test]
    fn flattens_relations() {
        let created_at = Utc::now();
        let record = PostRecord {
            post: Post {
                id: 1,
                title: "title".into(),
                content: "body".into(),
                created_at,
                author_id: 10,
            },
            author: user(10, "alice"),
            tags: vec![
                Tag { id: 2, name: "rust".into(), post_id: 1 },
                Tag { id: 3, name: "web".into(), post_id: 1 },
            ],
            images: vec![Image { id: 4, url: "storage/a.png".into(), post_id: 1 }],
            comments: vec![CommentRecord {
                comment: Comment { id: 5, content: "nice".into(), author_id: 11, post_id: 1 },
                author: user(11, "bob"),
                post: None,
            }],
        };

        let json = serde_json::to_value(to_post_dto(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "title",
                "author": {"id": 10, "username": "alice"},
                "comments": [{"id": 5, "author": {"id": 11, "username": "bob"}, "content": "nice"}],
                "tags": ["rust", "web"],
                "images": ["storage/a.png"],
                "content": "body",
                "createdAt": serde_json::to_value(created_at).unwrap(),
            })
        );
    }

    #[test]
    fn rejects_empty_tag_list_and_blank_fields() {
        let body = PostIn { title: "t".into(), content: "c".into(), tags: vec![] };
        assert!(body.validate().is_err());

        let body = PostIn { title: "".into(), content: "c".into(), tags: vec!["a".into()] };
        assert!(body.validate().is_err());

        let body = PostIn { title: "t".into(), content: "c".into(), tags: vec!["a".into()] };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<PostIn>(r#"{"title":"t","content":"c","tags":["a"],"authorId":3}"#);
        assert!(parsed.is_err());
    }
}
