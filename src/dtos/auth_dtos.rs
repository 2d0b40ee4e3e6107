use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

/// Body of both `/auth/signup` and `/auth/login`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CredentialsIn {
    #[validate(length(min = 3, max = 30, message = "username must be between 3 and 30 characters long"))]
    pub username: String,
    #[validate(length(min = 6, max = 20, message = "password must be between 6 and 20 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
}

#[derive(Serialize)]
pub struct SignupOut {
    pub message: String,
    pub user: UserDto,
}

#[derive(Serialize)]
pub struct LoginOut {
    pub message: String,
    pub token: String,
}

pub fn to_user_dto(user: &User) -> UserDto {
    UserDto {
        id: user.id,
        username: user.username.clone(),
    }
}
