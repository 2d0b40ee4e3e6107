// src/services/auth_services.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;
use crate::repositories::Datastore;

/// bcrypt work factor for stored passwords.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Lifetime of an issued access token.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Payload of the bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 key pair derived from the server secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            iat: now.timestamp().max(0) as usize,
            exp: (now + self.ttl).timestamp().max(0) as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Datastore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn Datastore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AppError> {
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_HASH_COST))
            .await
            .map_err(|e| AppError::internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| AppError::internal(format!("failed to hash password: {}", e)))?;

        let user = self.store.create_user(username, &hash).await.map_err(|e| {
            warn!("signup for {} rejected by datastore: {}", username, e);
            AppError::from(e)
        })?;

        info!("User registered: {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Returns a signed token for valid credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username"))?;

        let candidate = password.to_string();
        let hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &hash))
            .await
            .map_err(|e| AppError::internal(format!("password check task failed: {}", e)))?
            // an unparseable stored hash can never match
            .unwrap_or(false);
        if !matches {
            return Err(AppError::unauthorized("Invalid password"));
        }

        self.keys
            .issue(&user)
            .map_err(|e| AppError::internal(format!("failed to sign token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{DbError, Fault, MemoryStore};

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let svc = AuthService::new(store.clone(), JwtKeys::from_secret("test-secret"));
        (svc, store)
    }

    #[actix_web::test]
    async fn signup_stores_a_bcrypt_hash() {
        let (svc, store) = service();
        let user = svc.signup("alice", "password1").await.unwrap();

        assert_ne!(user.password, "password1");
        assert!(user.password.starts_with("$2"));
        assert!(bcrypt::verify("password1", &user.password).unwrap());
        let stored = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[actix_web::test]
    async fn duplicate_signup_is_a_400() {
        let (svc, _) = service();
        svc.signup("alice", "password1").await.unwrap();
        let err = svc.signup("alice", "password2").await.unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[actix_web::test]
    async fn login_with_unknown_username() {
        let (svc, _) = service();
        let err = svc.login("nobody", "password1").await.unwrap_err();
        assert_eq!(err, AppError::new(401, "Invalid username"));
    }

    #[actix_web::test]
    async fn login_with_wrong_password() {
        let (svc, _) = service();
        svc.signup("alice", "password1").await.unwrap();
        let err = svc.login("alice", "password2").await.unwrap_err();
        assert_eq!(err, AppError::new(401, "Invalid password"));
    }

    #[actix_web::test]
    async fn login_token_carries_id_and_username() {
        let (svc, _) = service();
        let user = svc.signup("alice", "password1").await.unwrap();
        let token = svc.login("alice", "password1").await.unwrap();

        let claims = svc.keys().verify(&token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS as usize);
    }

    #[actix_web::test]
    async fn lookup_failure_is_a_400() {
        let (svc, store) = service();
        store.fail_on(Fault::FindUser, DbError::new("connection refused"));
        let err = svc.login("alice", "password1").await.unwrap_err();
        assert_eq!(err, AppError::new(400, "connection refused"));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password: String::new(),
        };
        let token = JwtKeys::from_secret("one").issue(&user).unwrap();
        assert!(JwtKeys::from_secret("two").verify(&token).is_err());
    }
}
