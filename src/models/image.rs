use serde::Serialize;

use super::Post;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i32,
    pub url: String,
    pub post_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    #[serde(flatten)]
    pub image: Image,
    pub post: Post,
}
