use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: i64,
    pub name: String,
    pub status: String,
    pub registration_open: bool,
    pub created_at: chrono::NaiveDateTime,
}

/// Competition lifecycle statuses. ARCHIVED and CANCELLED are terminal for
/// registration but certificates can still be operated on.
pub mod competition_status {
    pub const DRAFT: &str = "DRAFT";
    pub const ACTIVE: &str = "ACTIVE";
    pub const COMPLETED: &str = "COMPLETED";
    pub const CANCELLED: &str = "CANCELLED";
    pub const ARCHIVED: &str = "ARCHIVED";

    pub const ALL: &[&str] = &[DRAFT, ACTIVE, COMPLETED, CANCELLED, ARCHIVED];
}
