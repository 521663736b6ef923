use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Materialized outcome for one participation, written by the city-completion
/// transition and deleted again on reopen. Never hand-edited while locked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompetitionResult {
    pub result_id: i64,
    pub participation_id: i64,
    pub result_status: String,
    pub position: Option<i64>,
    pub locked: bool,
    pub created_at: chrono::NaiveDateTime,
}

pub mod result_status {
    pub const PARTICIPATED: &str = "PARTICIPATED";
    pub const FINALIST: &str = "FINALIST";
    pub const WINNER: &str = "WINNER";
}
