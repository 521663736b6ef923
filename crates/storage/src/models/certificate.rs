use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One certificate per (participation, template). Status walks
/// GENERATED -> RELEASED <-> REVOKED; regeneration keeps identity and status.
/// Templates live in an external rendering service, only the id is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Certificate {
    pub certificate_id: i64,
    pub participation_id: i64,
    pub template_id: i64,
    pub status: String,
    pub revoke_reason: Option<String>,
    pub generated_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

pub mod certificate_status {
    pub const GENERATED: &str = "GENERATED";
    pub const RELEASED: &str = "RELEASED";
    pub const REVOKED: &str = "REVOKED";
}
