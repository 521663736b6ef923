use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One manual winner selection. Positions are caller-assigned; uniqueness and
/// contiguity are deliberately not validated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WinnerSelection {
    pub round_participation_id: i64,
    pub position: i64,
}

/// Replaces the round's entire winner set (not additive).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SelectWinnersRequest {
    #[validate(length(min = 1, message = "At least one winner must be selected"))]
    pub winners: Vec<WinnerSelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectWinnersOutcome {
    pub selected: u64,
}

/// A finale winner of one source city, offered for import
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableWinner {
    pub participation_id: i64,
    pub full_name: String,
    pub score: f64,
    pub winner_position: Option<i64>,
    pub already_imported: bool,
}

/// Winners of one city's finale round, ordered by score descending
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityWinners {
    pub city_id: i64,
    pub city_name: String,
    pub winners: Vec<AvailableWinner>,
}

/// How many of a city's finale winners to import into the target round
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityWinnerPick {
    pub city_id: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImportWinnersRequest {
    #[validate(length(min = 1, message = "At least one city must be selected"))]
    pub picks: Vec<CityWinnerPick>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportWinnersOutcome {
    pub imported: u64,
}
