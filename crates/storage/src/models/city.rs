use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct City {
    pub city_id: i64,
    pub name: String,
}

/// Competition/city link. `is_finished` is the city-completion state for the
/// pair: results for the city exist if and only if it is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompetitionCity {
    pub competition_id: i64,
    pub city_id: i64,
    pub event_date: Option<NaiveDate>,
    pub is_finished: bool,
}
