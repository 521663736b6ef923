use sqlx::SqlitePool;

use crate::dto::participation::RegisterParticipationRequest;
use crate::error::{Result, StorageError};
use crate::models::{Participation, competition_status, participation_source};
use crate::repository::city::CityRepository;
use crate::repository::competition::CompetitionRepository;

/// Repository for Participation database operations
pub struct ParticipationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ParticipationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Participation> {
        let participation = sqlx::query_as::<_, Participation>(
            r#"
            SELECT participation_id, user_id, full_name, competition_id, city_id, source, created_at
            FROM participations
            WHERE participation_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found(format!("Participation {id} does not exist")))?;

        Ok(participation)
    }

    /// Register a participant. Self-registration requires the competition's
    /// registration to be open; admins can add regardless, except into
    /// cancelled or archived competitions.
    pub async fn register(
        &self,
        competition_id: i64,
        req: &RegisterParticipationRequest,
    ) -> Result<Participation> {
        let competition = CompetitionRepository::new(self.pool)
            .find_by_id(competition_id)
            .await?;

        if matches!(
            competition.status.as_str(),
            competition_status::CANCELLED | competition_status::ARCHIVED
        ) {
            return Err(StorageError::state_conflict(format!(
                "Competition {competition_id} is {} and closed for registration",
                competition.status
            )));
        }

        if req.source == participation_source::USER_SELF && !competition.registration_open {
            return Err(StorageError::state_conflict(format!(
                "Registration for competition {competition_id} is closed"
            )));
        }

        // Also rejects cities never attached to the competition.
        CityRepository::new(self.pool)
            .find_link(competition_id, req.city_id)
            .await?;

        let participation = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO participations (user_id, full_name, competition_id, city_id, source)
            VALUES (?, ?, ?, ?, ?)
            RETURNING participation_id, user_id, full_name, competition_id, city_id, source, created_at
            "#,
        )
        .bind(req.user_id)
        .bind(&req.full_name)
        .bind(competition_id)
        .bind(req.city_id)
        .bind(&req.source)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                    return StorageError::ConstraintViolation(
                        "User is already registered for this competition and city".to_string(),
                    );
                }
            }
            StorageError::from(e)
        })?;

        Ok(participation)
    }

    /// List participations of a competition, optionally narrowed to one city
    pub async fn list_for_competition(
        &self,
        competition_id: i64,
        city_id: Option<i64>,
    ) -> Result<Vec<Participation>> {
        let participations = match city_id {
            Some(city_id) => {
                sqlx::query_as::<_, Participation>(
                    r#"
                    SELECT participation_id, user_id, full_name, competition_id, city_id, source, created_at
                    FROM participations
                    WHERE competition_id = ? AND city_id = ?
                    ORDER BY participation_id
                    "#,
                )
                .bind(competition_id)
                .bind(city_id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Participation>(
                    r#"
                    SELECT participation_id, user_id, full_name, competition_id, city_id, source, created_at
                    FROM participations
                    WHERE competition_id = ?
                    ORDER BY participation_id
                    "#,
                )
                .bind(competition_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(participations)
    }
}
