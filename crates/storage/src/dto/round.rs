use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Round, round_status};

/// Request payload for creating a round. The round number is assigned by the
/// server (max + 1 for the competition/city pair) and cannot be supplied.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoundRequest {
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(default)]
    pub is_finale: bool,
}

/// Request payload for updating a round
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRoundRequest {
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    pub is_finale: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundResponse {
    pub round_id: i64,
    pub competition_id: i64,
    pub city_id: i64,
    pub round_number: i64,
    pub name: Option<String>,
    pub status: String,
    pub is_finale: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Round> for RoundResponse {
    fn from(r: Round) -> Self {
        Self {
            round_id: r.round_id,
            competition_id: r.competition_id,
            city_id: r.city_id,
            round_number: r.round_number,
            name: r.name,
            status: r.status,
            is_finale: r.is_finale,
            created_at: r.created_at,
        }
    }
}

/// One participant of a round with their score record, if any
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RoundParticipantDetail {
    pub round_participation_id: i64,
    pub participation_id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub qualified_by: String,
    pub score: Option<f64>,
    pub rank_in_round: Option<i64>,
    pub is_winner: bool,
    pub winner_position: Option<i64>,
    pub notes: Option<String>,
}

/// Round detail: the round plus its participant and score listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundDetailResponse {
    #[serde(flatten)]
    pub round: RoundResponse,
    pub participants: Vec<RoundParticipantDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddParticipantRequest {
    pub participation_id: i64,
}

/// Request payload for top-N promotion into the next round
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoteRequest {
    pub count: i64,
}

/// Single-participant promotion override, out of ranking order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoteParticipantRequest {
    pub participation_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromotionOutcome {
    pub promoted: u64,
    pub already_present: u64,
}

/// One row of a round leaderboard, ordered by rank ascending
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub rank_in_round: i64,
    pub round_participation_id: i64,
    pub participation_id: i64,
    pub full_name: String,
    pub score: f64,
    pub is_winner: bool,
    pub winner_position: Option<i64>,
}

/// A participation of the round's competition/city not yet in the round
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EligibleParticipant {
    pub participation_id: i64,
    pub user_id: i64,
    pub full_name: String,
}

fn validate_status(status: &str) -> Result<(), validator::ValidationError> {
    if round_status::ALL.contains(&status) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_status"))
    }
}
