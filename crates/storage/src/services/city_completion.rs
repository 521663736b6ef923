use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::dto::city_status::CityStatusResponse;
use crate::error::{Result, StorageError};
use crate::models::{CompetitionCity, competition_status, result_status};

/// Completion flags for one (competition, city) track.
pub async fn city_status(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
) -> Result<CityStatusResponse> {
    let mut conn = pool.acquire().await?;
    let link = fetch_link(&mut *conn, competition_id, city_id).await?;

    let finale_round_id = fetch_finale_round_id(&mut *conn, competition_id, city_id).await?;
    let finale_completed = match finale_round_id {
        Some(round_id) => has_winners(&mut *conn, round_id).await?,
        None => false,
    };

    Ok(CityStatusResponse {
        competition_id,
        city_id,
        is_finished: link.is_finished,
        has_finale: finale_round_id.is_some(),
        finale_completed,
        can_mark_finished: !link.is_finished && finale_completed,
    })
}

/// Open -> Finished transition.
///
/// Requires a finale round with at least one selected winner. Writes one
/// Result per participation of the city: WINNER with its position for finale
/// winners, FINALIST for finale participants without the winner flag,
/// PARTICIPATED for everyone else. Finishing the last open city advances an
/// ACTIVE competition to COMPLETED. Finishing an already-finished city is a
/// no-op returning the current state.
pub async fn mark_city_finished(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
) -> Result<CityStatusResponse> {
    let mut tx = pool.begin().await?;

    let link = fetch_link(&mut *tx, competition_id, city_id).await?;
    if link.is_finished {
        tx.commit().await?;
        return city_status(pool, competition_id, city_id).await;
    }

    let finale_round_id = fetch_finale_round_id(&mut *tx, competition_id, city_id)
        .await?
        .ok_or_else(|| {
            StorageError::state_conflict(format!(
                "City {city_id} has no finale round and cannot be marked finished"
            ))
        })?;

    // participation_id -> winner_position for the finale winners
    let winners: HashMap<i64, Option<i64>> = sqlx::query_as::<_, (i64, Option<i64>)>(
        r#"
        SELECT rp.participation_id, rs.winner_position
        FROM round_scores rs
        INNER JOIN round_participations rp
            ON rp.round_participation_id = rs.round_participation_id
        WHERE rs.round_id = ? AND rs.is_winner = 1
        "#,
    )
    .bind(finale_round_id)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .collect();

    if winners.is_empty() {
        return Err(StorageError::state_conflict(format!(
            "Finale round of city {city_id} has no winners selected"
        )));
    }

    let finalists: Vec<i64> = sqlx::query_scalar(
        "SELECT participation_id FROM round_participations WHERE round_id = ?",
    )
    .bind(finale_round_id)
    .fetch_all(&mut *tx)
    .await?;

    let participations: Vec<i64> = sqlx::query_scalar(
        "SELECT participation_id FROM participations WHERE competition_id = ? AND city_id = ?",
    )
    .bind(competition_id)
    .bind(city_id)
    .fetch_all(&mut *tx)
    .await?;

    for participation_id in &participations {
        let (status, position) = if let Some(position) = winners.get(participation_id) {
            (result_status::WINNER, *position)
        } else if finalists.contains(participation_id) {
            (result_status::FINALIST, None)
        } else {
            (result_status::PARTICIPATED, None)
        };

        sqlx::query(
            r#"
            INSERT INTO results (participation_id, result_status, position, locked)
            VALUES (?, ?, ?, 1)
            ON CONFLICT (participation_id) DO UPDATE
            SET result_status = excluded.result_status, position = excluded.position, locked = 1
            "#,
        )
        .bind(participation_id)
        .bind(status)
        .bind(position)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "UPDATE competition_cities SET is_finished = 1 WHERE competition_id = ? AND city_id = ?",
    )
    .bind(competition_id)
    .bind(city_id)
    .execute(&mut *tx)
    .await?;

    let open_left: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM competition_cities WHERE competition_id = ? AND is_finished = 0",
    )
    .bind(competition_id)
    .fetch_one(&mut *tx)
    .await?;

    if open_left == 0 {
        sqlx::query("UPDATE competitions SET status = ? WHERE competition_id = ? AND status = ?")
            .bind(competition_status::COMPLETED)
            .bind(competition_id)
            .bind(competition_status::ACTIVE)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(
        competition_id,
        city_id,
        results = participations.len(),
        "city marked finished"
    );

    city_status(pool, competition_id, city_id).await
}

/// Finished -> Open transition. Deletes exactly the Results of this city's
/// participations and reverts an auto-completed competition to ACTIVE.
/// Reopening an already-open city is a no-op returning the current state.
pub async fn reopen_city(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
) -> Result<CityStatusResponse> {
    let mut tx = pool.begin().await?;

    let link = fetch_link(&mut *tx, competition_id, city_id).await?;
    if !link.is_finished {
        tx.commit().await?;
        return city_status(pool, competition_id, city_id).await;
    }

    sqlx::query(
        r#"
        DELETE FROM results
        WHERE participation_id IN (
            SELECT participation_id FROM participations
            WHERE competition_id = ? AND city_id = ?
        )
        "#,
    )
    .bind(competition_id)
    .bind(city_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE competition_cities SET is_finished = 0 WHERE competition_id = ? AND city_id = ?",
    )
    .bind(competition_id)
    .bind(city_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE competitions SET status = ? WHERE competition_id = ? AND status = ?")
        .bind(competition_status::ACTIVE)
        .bind(competition_id)
        .bind(competition_status::COMPLETED)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(competition_id, city_id, "city reopened");

    city_status(pool, competition_id, city_id).await
}

async fn fetch_link(
    conn: &mut SqliteConnection,
    competition_id: i64,
    city_id: i64,
) -> Result<CompetitionCity> {
    sqlx::query_as::<_, CompetitionCity>(
        r#"
        SELECT competition_id, city_id, event_date, is_finished
        FROM competition_cities
        WHERE competition_id = ? AND city_id = ?
        "#,
    )
    .bind(competition_id)
    .bind(city_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        StorageError::not_found(format!(
            "City {city_id} is not attached to competition {competition_id}"
        ))
    })
}

async fn fetch_finale_round_id(
    conn: &mut SqliteConnection,
    competition_id: i64,
    city_id: i64,
) -> Result<Option<i64>> {
    let round_id = sqlx::query_scalar(
        r#"
        SELECT round_id FROM rounds
        WHERE competition_id = ? AND city_id = ? AND is_finale = 1
        ORDER BY round_number DESC
        LIMIT 1
        "#,
    )
    .bind(competition_id)
    .bind(city_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(round_id)
}

async fn has_winners(conn: &mut SqliteConnection, round_id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM round_scores WHERE round_id = ? AND is_winner = 1)")
            .bind(round_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(exists)
}
