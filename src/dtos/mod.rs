pub mod auth_dtos;
pub mod comment_dtos;
pub mod post_dtos;

pub use auth_dtos::{to_user_dto, CredentialsIn, LoginOut, SignupOut, UserDto};
pub use comment_dtos::{to_comment_dto, CommentDto, CreateCommentIn, UpdateCommentIn};
pub use post_dtos::{to_post_dto, PostDto, PostIn};
