use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Competition, competition_status};

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(custom(function = "validate_status"))]
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub registration_open: bool,
}

/// Request payload for updating an existing competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCompetitionRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    pub registration_open: Option<bool>,
}

/// Response containing competition details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub competition_id: i64,
    pub name: String,
    pub status: String,
    pub registration_open: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Competition> for CompetitionResponse {
    fn from(c: Competition) -> Self {
        Self {
            competition_id: c.competition_id,
            name: c.name,
            status: c.status,
            registration_open: c.registration_open,
            created_at: c.created_at,
        }
    }
}

// Validation helpers
fn default_status() -> String {
    competition_status::DRAFT.to_string()
}

fn validate_status(status: &str) -> Result<(), validator::ValidationError> {
    if competition_status::ALL.contains(&status) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_status"))
    }
}
