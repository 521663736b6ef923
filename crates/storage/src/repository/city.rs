use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::dto::city::CompetitionCityResponse;
use crate::error::{Result, StorageError};
use crate::models::{City, CompetitionCity};

/// Repository for City and CompetitionCity database operations
pub struct CityRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CityRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<City>> {
        let cities = sqlx::query_as::<_, City>("SELECT city_id, name FROM cities ORDER BY name")
            .fetch_all(self.pool)
            .await?;

        Ok(cities)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<City> {
        let city = sqlx::query_as::<_, City>("SELECT city_id, name FROM cities WHERE city_id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StorageError::not_found(format!("City {id} does not exist")))?;

        Ok(city)
    }

    pub async fn create(&self, name: &str) -> Result<City> {
        let city = sqlx::query_as::<_, City>(
            r#"
            INSERT INTO cities (name)
            VALUES (?)
            RETURNING city_id, name
            "#,
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique(e, "City name already exists"))?;

        Ok(city)
    }

    /// Attach a city to a competition, creating the link row
    pub async fn attach_to_competition(
        &self,
        competition_id: i64,
        city_id: i64,
        event_date: Option<NaiveDate>,
    ) -> Result<CompetitionCity> {
        let link = sqlx::query_as::<_, CompetitionCity>(
            r#"
            INSERT INTO competition_cities (competition_id, city_id, event_date)
            VALUES (?, ?, ?)
            RETURNING competition_id, city_id, event_date, is_finished
            "#,
        )
        .bind(competition_id)
        .bind(city_id)
        .bind(event_date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique(e, "City is already attached to this competition"))?;

        Ok(link)
    }

    /// Cities attached to one competition, with their completion flags
    pub async fn list_for_competition(
        &self,
        competition_id: i64,
    ) -> Result<Vec<CompetitionCityResponse>> {
        let cities = sqlx::query_as::<_, CompetitionCityResponse>(
            r#"
            SELECT c.city_id, c.name, cc.event_date, cc.is_finished
            FROM competition_cities cc
            INNER JOIN cities c ON c.city_id = cc.city_id
            WHERE cc.competition_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(cities)
    }

    /// The link row for one (competition, city) pair
    pub async fn find_link(&self, competition_id: i64, city_id: i64) -> Result<CompetitionCity> {
        let link = sqlx::query_as::<_, CompetitionCity>(
            r#"
            SELECT competition_id, city_id, event_date, is_finished
            FROM competition_cities
            WHERE competition_id = ? AND city_id = ?
            "#,
        )
        .bind(competition_id)
        .bind(city_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            StorageError::not_found(format!(
                "City {city_id} is not attached to competition {competition_id}"
            ))
        })?;

        Ok(link)
    }
}

fn map_unique(e: sqlx::Error, msg: &str) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
            return StorageError::ConstraintViolation(msg.to_string());
        }
    }
    StorageError::from(e)
}
