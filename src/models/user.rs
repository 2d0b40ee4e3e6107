use serde::{Deserialize, Serialize};

/// Row of `users`. The password column holds a bcrypt hash and never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}
