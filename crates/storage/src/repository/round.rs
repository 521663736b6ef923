use sqlx::SqlitePool;

use crate::dto::round::{
    CreateRoundRequest, EligibleParticipant, LeaderboardEntry, RoundParticipantDetail,
    UpdateRoundRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{Round, round_status};

/// Repository for Round database operations
pub struct RoundRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RoundRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Round> {
        let round = sqlx::query_as::<_, Round>(
            r#"
            SELECT round_id, competition_id, city_id, round_number, name, status,
                   is_finale, created_at
            FROM rounds
            WHERE round_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found(format!("Round {id} does not exist")))?;

        Ok(round)
    }

    /// Create a round for a (competition, city) pair. The round number is
    /// computed inside the transaction as max(round_number) + 1, so callers
    /// cannot introduce gaps or duplicates.
    pub async fn create(
        &self,
        competition_id: i64,
        city_id: i64,
        req: &CreateRoundRequest,
    ) -> Result<Round> {
        let mut tx = self.pool.begin().await?;

        let attached: Option<i64> = sqlx::query_scalar(
            "SELECT city_id FROM competition_cities WHERE competition_id = ? AND city_id = ?",
        )
        .bind(competition_id)
        .bind(city_id)
        .fetch_optional(&mut *tx)
        .await?;

        if attached.is_none() {
            return Err(StorageError::not_found(format!(
                "City {city_id} is not attached to competition {competition_id}"
            )));
        }

        let next_number: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(round_number), 0) + 1
            FROM rounds
            WHERE competition_id = ? AND city_id = ?
            "#,
        )
        .bind(competition_id)
        .bind(city_id)
        .fetch_one(&mut *tx)
        .await?;

        let round = sqlx::query_as::<_, Round>(
            r#"
            INSERT INTO rounds (competition_id, city_id, round_number, name, is_finale)
            VALUES (?, ?, ?, ?, ?)
            RETURNING round_id, competition_id, city_id, round_number, name, status,
                      is_finale, created_at
            "#,
        )
        .bind(competition_id)
        .bind(city_id)
        .bind(next_number)
        .bind(&req.name)
        .bind(req.is_finale)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(round)
    }

    /// Update a round; absent fields keep their current value
    pub async fn update(&self, id: i64, req: &UpdateRoundRequest) -> Result<Round> {
        let existing = self.find_by_id(id).await?;

        let name = req.name.as_deref().or(existing.name.as_deref());
        let status = req.status.as_deref().unwrap_or(&existing.status);
        let is_finale = req.is_finale.unwrap_or(existing.is_finale);

        let round = sqlx::query_as::<_, Round>(
            r#"
            UPDATE rounds
            SET name = ?, status = ?, is_finale = ?
            WHERE round_id = ?
            RETURNING round_id, competition_id, city_id, round_number, name, status,
                      is_finale, created_at
            "#,
        )
        .bind(name)
        .bind(status)
        .bind(is_finale)
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(round)
    }

    /// Delete a round; cascades to its participations and scores
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM rounds WHERE round_id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("Round {id} does not exist")));
        }

        Ok(())
    }

    pub async fn archive(&self, id: i64) -> Result<Round> {
        self.set_status(id, round_status::ARCHIVED).await
    }

    /// Unarchiving restores the round to COMPLETED; archiving is modeled as
    /// hiding a concluded round.
    pub async fn unarchive(&self, id: i64) -> Result<Round> {
        let existing = self.find_by_id(id).await?;
        if existing.status != round_status::ARCHIVED {
            return Err(StorageError::state_conflict(format!(
                "Round {id} is not archived"
            )));
        }
        self.set_status(id, round_status::COMPLETED).await
    }

    async fn set_status(&self, id: i64, status: &str) -> Result<Round> {
        let round = sqlx::query_as::<_, Round>(
            r#"
            UPDATE rounds
            SET status = ?
            WHERE round_id = ?
            RETURNING round_id, competition_id, city_id, round_number, name, status,
                      is_finale, created_at
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found(format!("Round {id} does not exist")))?;

        Ok(round)
    }

    /// Participant + score listing for round detail
    pub async fn list_participants(&self, round_id: i64) -> Result<Vec<RoundParticipantDetail>> {
        let participants = sqlx::query_as::<_, RoundParticipantDetail>(
            r#"
            SELECT rp.round_participation_id, rp.participation_id, p.user_id, p.full_name,
                   rp.qualified_by, rs.score, rs.rank_in_round,
                   COALESCE(rs.is_winner, 0) AS is_winner, rs.winner_position, rs.notes
            FROM round_participations rp
            INNER JOIN participations p ON p.participation_id = rp.participation_id
            LEFT JOIN round_scores rs ON rs.round_participation_id = rp.round_participation_id
            WHERE rp.round_id = ?
            ORDER BY rs.rank_in_round IS NULL, rs.rank_in_round, rp.participation_id
            "#,
        )
        .bind(round_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    /// Scored participants ordered by rank; the participation id breaks ties
    /// the same way promotion does.
    pub async fn leaderboard(&self, round_id: i64) -> Result<Vec<LeaderboardEntry>> {
        self.find_by_id(round_id).await?;

        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT rs.rank_in_round, rs.round_participation_id, rp.participation_id,
                   p.full_name, rs.score, rs.is_winner, rs.winner_position
            FROM round_scores rs
            INNER JOIN round_participations rp
                ON rp.round_participation_id = rs.round_participation_id
            INNER JOIN participations p ON p.participation_id = rp.participation_id
            WHERE rs.round_id = ? AND rs.score IS NOT NULL
            ORDER BY rs.rank_in_round, rp.participation_id
            "#,
        )
        .bind(round_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Participations of the round's competition/city not yet in the round
    pub async fn eligible_participants(&self, round_id: i64) -> Result<Vec<EligibleParticipant>> {
        let round = self.find_by_id(round_id).await?;

        let eligible = sqlx::query_as::<_, EligibleParticipant>(
            r#"
            SELECT p.participation_id, p.user_id, p.full_name
            FROM participations p
            WHERE p.competition_id = ? AND p.city_id = ?
              AND p.participation_id NOT IN (
                  SELECT participation_id FROM round_participations WHERE round_id = ?
              )
            ORDER BY p.participation_id
            "#,
        )
        .bind(round.competition_id)
        .bind(round.city_id)
        .bind(round_id)
        .fetch_all(self.pool)
        .await?;

        Ok(eligible)
    }
}
