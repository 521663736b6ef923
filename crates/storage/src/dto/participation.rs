use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Participation, participation_source};

/// Request payload for registering a participant into a competition/city
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterParticipationRequest {
    pub user_id: i64,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Full name must be between 1 and 255 characters"
    ))]
    pub full_name: String,

    pub city_id: i64,

    #[validate(custom(function = "validate_source"))]
    #[serde(default = "default_source")]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipationResponse {
    pub participation_id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub competition_id: i64,
    pub city_id: i64,
    pub source: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Participation> for ParticipationResponse {
    fn from(p: Participation) -> Self {
        Self {
            participation_id: p.participation_id,
            user_id: p.user_id,
            full_name: p.full_name,
            competition_id: p.competition_id,
            city_id: p.city_id,
            source: p.source,
            created_at: p.created_at,
        }
    }
}

fn default_source() -> String {
    participation_source::USER_SELF.to_string()
}

fn validate_source(source: &str) -> Result<(), validator::ValidationError> {
    if participation_source::ALL.contains(&source) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_source"))
    }
}
