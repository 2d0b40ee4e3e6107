pub mod auth_extractor;
pub mod validated_json;

pub use auth_extractor::{AuthenticatedUser, RequireAuth};
pub use validated_json::ValidatedJson;
