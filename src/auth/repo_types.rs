use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account row; its `id` is the owner id on every plan and payment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
