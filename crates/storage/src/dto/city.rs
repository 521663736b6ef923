use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for creating a city. Cities can be ad-hoc branches, e.g. a
/// grand-finale venue that is not a real place.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCityRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,
}

/// Request payload for attaching a city to a competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttachCityRequest {
    pub city_id: i64,
    pub event_date: Option<NaiveDate>,
}

/// A city as attached to one competition
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CompetitionCityResponse {
    pub city_id: i64,
    pub name: String,
    pub event_date: Option<NaiveDate>,
    pub is_finished: bool,
}
