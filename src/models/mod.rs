pub mod comment;
pub mod image;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentRecord};
pub use image::{Image, ImageRecord};
pub use post::{Post, PostRecord, Tag};
pub use user::User;
