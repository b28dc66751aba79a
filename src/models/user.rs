use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Result shape for the user search endpoint. The users table itself is
/// owned by the registration flows; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}
