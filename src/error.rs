// src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::repositories::DbError;

/// The one error shape that leaves a service. Rendered as
/// `{"statusCode": .., "errorMessage": ..}` by [`ResponseError`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{status_code}: {error_message}")]
pub struct AppError {
    pub status_code: u16,
    pub error_message: String,
}

impl AppError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error_message: message.into(),
        }
    }

    /// Request body failed its schema.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// Any persistence failure other than a missing record. The message is passed through as-is.
    pub fn datastore(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    /// "<Entity> with id <id> not found"
    pub fn entity_not_found(entity: &str, id: i32) -> Self {
        Self::not_found(format!("{} with id {} not found", entity, id))
    }

    /// Translate a datastore failure for an operation addressing `entity` by `id`.
    pub fn from_datastore(err: DbError, entity: &str, id: i32) -> Self {
        if err.is_not_found() {
            Self::entity_not_found(entity, id)
        } else {
            Self::datastore(err.message)
        }
    }
}

/// Writes that do not address an existing row by id: every failure is a 400.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        Self::datastore(err.message)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(self)
    }
}
