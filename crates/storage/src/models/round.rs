use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One scored stage of a competition within one city. `round_number` is
/// assigned by the server as max(round_number) + 1 per (competition, city).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Round {
    pub round_id: i64,
    pub competition_id: i64,
    pub city_id: i64,
    pub round_number: i64,
    pub name: Option<String>,
    pub status: String,
    pub is_finale: bool,
    pub created_at: chrono::NaiveDateTime,
}

pub mod round_status {
    pub const PENDING: &str = "PENDING";
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const COMPLETED: &str = "COMPLETED";
    pub const ARCHIVED: &str = "ARCHIVED";

    pub const ALL: &[&str] = &[PENDING, IN_PROGRESS, COMPLETED, ARCHIVED];
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoundParticipation {
    pub round_participation_id: i64,
    pub round_id: i64,
    pub participation_id: i64,
    pub qualified_by: String,
    pub created_at: chrono::NaiveDateTime,
}

pub mod qualified_by {
    pub const AUTOMATIC: &str = "AUTOMATIC";
    pub const MANUAL: &str = "MANUAL";
}

/// Score record for one round participation. Created on first score entry;
/// a cleared score leaves the row with NULL score and NULL rank. Winner flags
/// are set only by explicit winner selection on finale rounds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoundScore {
    pub round_score_id: i64,
    pub round_participation_id: i64,
    pub round_id: i64,
    pub score: Option<f64>,
    pub rank_in_round: Option<i64>,
    pub is_winner: bool,
    pub winner_position: Option<i64>,
    pub notes: Option<String>,
    pub updated_at: chrono::NaiveDateTime,
}
