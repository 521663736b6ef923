use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Completion flags for one (competition, city) track
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityStatusResponse {
    pub competition_id: i64,
    pub city_id: i64,
    pub is_finished: bool,
    pub has_finale: bool,
    pub finale_completed: bool,
    pub can_mark_finished: bool,
}
