use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user's entry into one competition in one city. Identity is immutable once
/// created; rows referenced by rounds are never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participation {
    pub participation_id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub competition_id: i64,
    pub city_id: i64,
    pub source: String,
    pub created_at: chrono::NaiveDateTime,
}

pub mod participation_source {
    pub const USER_SELF: &str = "USER_SELF";
    pub const ADMIN_ADDED: &str = "ADMIN_ADDED";

    pub const ALL: &[&str] = &[USER_SELF, ADMIN_ADDED];
}
