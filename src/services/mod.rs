pub mod auth_services;
pub mod comment_services;
pub mod image_services;
pub mod post_services;

pub use auth_services::{AuthService, Claims, JwtKeys};
pub use comment_services::CommentService;
pub use image_services::ImageService;
pub use post_services::PostService;
