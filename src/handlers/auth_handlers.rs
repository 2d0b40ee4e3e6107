use actix_web::{post, web, HttpResponse};
use log::info;

use crate::dtos::{to_user_dto, CredentialsIn, LoginOut, SignupOut};
use crate::error::AppError;
use crate::middleware::ValidatedJson;
use crate::AppState;

/// POST /auth/signup
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    body: ValidatedJson<CredentialsIn>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    info!("Signing up user: {}", body.username);

    let user = state.auth.signup(&body.username, &body.password).await?;

    Ok(HttpResponse::Created().json(SignupOut {
        message: "User created successfully".to_string(),
        user: to_user_dto(&user),
    }))
}

/// POST /auth/login
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: ValidatedJson<CredentialsIn>,
) -> Result<HttpResponse, AppError> {
    info!("Login attempt for user: {}", body.username);

    let token = state.auth.login(&body.username, &body.password).await?;

    Ok(HttpResponse::Ok().json(LoginOut {
        message: "Login successful".to_string(),
        token,
    }))
}
