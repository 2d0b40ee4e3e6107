pub mod auth_handlers;
pub mod comment_handlers;
pub mod image_handlers;
pub mod post_handlers;

use actix_web::{web, HttpRequest};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::services::JwtKeys;

fn bad_path(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(err.to_string()).into()
}

fn bad_query(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(err.to_string()).into()
}

/// Registers every route. `/posts` and `/comments` require a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig, keys: &JwtKeys) {
    cfg.app_data(web::PathConfig::default().error_handler(bad_path))
        .app_data(web::QueryConfig::default().error_handler(bad_query))
        .service(
            web::scope("/auth")
                .service(auth_handlers::signup) // POST /auth/signup
                .service(auth_handlers::login), // POST /auth/login
        )
        .service(
            web::scope("/posts")
                .wrap(RequireAuth::new(keys.clone()))
                .service(post_handlers::get_posts)
                .service(post_handlers::create_post)
                .service(post_handlers::get_post)
                .service(post_handlers::update_post)
                .service(post_handlers::delete_post)
                .service(image_handlers::upload_image)
                .service(image_handlers::delete_image),
        )
        .service(
            web::scope("/comments")
                .wrap(RequireAuth::new(keys.clone()))
                .service(comment_handlers::create_comment)
                .service(comment_handlers::get_comment)
                .service(comment_handlers::update_comment)
                .service(comment_handlers::delete_comment),
        );
}
