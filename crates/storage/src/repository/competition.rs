use sqlx::SqlitePool;

use crate::dto::competition::{CreateCompetitionRequest, UpdateCompetitionRequest};
use crate::error::{Result, StorageError};
use crate::models::Competition;

/// Repository for Competition database operations
pub struct CompetitionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all competitions
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT competition_id, name, status, registration_open, created_at
            FROM competitions
            ORDER BY created_at DESC, competition_id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    /// Get a competition by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            SELECT competition_id, name, status, registration_open, created_at
            FROM competitions
            WHERE competition_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found(format!("Competition {id} does not exist")))?;

        Ok(competition)
    }

    /// Create a new competition
    pub async fn create(&self, req: &CreateCompetitionRequest) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (name, status, registration_open)
            VALUES (?, ?, ?)
            RETURNING competition_id, name, status, registration_open, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.status)
        .bind(req.registration_open)
        .fetch_one(self.pool)
        .await?;

        Ok(competition)
    }

    /// Update a competition; absent fields keep their current value
    pub async fn update(&self, id: i64, req: &UpdateCompetitionRequest) -> Result<Competition> {
        let existing = self.find_by_id(id).await?;

        let name = req.name.as_deref().unwrap_or(&existing.name);
        let status = req.status.as_deref().unwrap_or(&existing.status);
        let registration_open = req.registration_open.unwrap_or(existing.registration_open);

        let competition = sqlx::query_as::<_, Competition>(
            r#"
            UPDATE competitions
            SET name = ?, status = ?, registration_open = ?
            WHERE competition_id = ?
            RETURNING competition_id, name, status, registration_open, created_at
            "#,
        )
        .bind(name)
        .bind(status)
        .bind(registration_open)
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(competition)
    }

    /// Delete a competition by ID
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM competitions WHERE competition_id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!(
                "Competition {id} does not exist"
            )));
        }

        Ok(())
    }
}
