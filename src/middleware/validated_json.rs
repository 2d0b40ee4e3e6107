// src/middleware/validated_json.rs
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{web, Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use log::debug;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// `web::Json<T>` that also runs `T`'s validator rules.
///
/// Malformed JSON, unknown fields and failed rules all become a 400 `AppError`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let body = json.await.map_err(|e| {
                debug!("rejected request body: {}", e);
                AppError::validation(e.to_string())
            })?;
            let body = body.into_inner();
            body.validate()
                .map_err(|errs| AppError::validation(describe(&errs)))?;
            Ok(ValidatedJson(body))
        })
    }
}

/// One message per failed rule, ordered by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::CredentialsIn;
    use actix_web::{http::header, post, test, App, HttpResponse};

    #[post("/echo")]
    async fn echo(body: ValidatedJson<CredentialsIn>) -> HttpResponse {
        HttpResponse::Ok().body(body.username.clone())
    }

    async fn send(payload: &str) -> (u16, Option<serde_json::Value>) {
        let app = test::init_service(App::new().service(echo)).await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(payload.to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        if status == 200 {
            return (status, None);
        }
        (status, Some(test::read_body_json(resp).await))
    }

    #[actix_web::test]
    async fn valid_body_passes_through() {
        let (status, _) = send(r#"{"username":"frank","password":"secret1"}"#).await;
        assert_eq!(status, 200);
    }

    #[actix_web::test]
    async fn malformed_json_is_400() {
        let (status, body) = send(r#"{"username":"frank","#).await;
        assert_eq!(status, 400);
        assert_eq!(body.unwrap()["statusCode"], 400);
    }

    #[actix_web::test]
    async fn unknown_field_is_400() {
        let (status, _) = send(r#"{"username":"frank","password":"secret1","admin":true}"#).await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn rule_messages_are_reported_in_field_order() {
        let (status, body) = send(r#"{"username":"fr","password":"123"}"#).await;
        assert_eq!(status, 400);
        assert_eq!(
            body.unwrap()["errorMessage"],
            "password must be between 6 and 20 characters long; username must be between 3 and 30 characters long"
        );
    }
}
