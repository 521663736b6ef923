use std::collections::HashMap;

use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::dto::winners::{
    AvailableWinner, CityWinners, ImportWinnersOutcome, ImportWinnersRequest, SelectWinnersOutcome,
    SelectWinnersRequest,
};
use crate::error::{Result, StorageError};
use crate::models::qualified_by;

use super::score_ingestion::fetch_round;

/// Replace the winner set of a finale round.
///
/// Positions are taken from the caller as-is (uniqueness and contiguity are
/// deliberately not validated), but every selection must reference a scored
/// participation of the round. The previous selection is cleared first, so
/// selecting twice is an overwrite, not a merge.
pub async fn select_winners(
    pool: &SqlitePool,
    round_id: i64,
    req: &SelectWinnersRequest,
) -> Result<SelectWinnersOutcome> {
    if req.winners.is_empty() {
        return Err(StorageError::validation("At least one winner must be selected"));
    }

    let mut tx = pool.begin().await?;

    let round = fetch_round(&mut *tx, round_id).await?;
    if !round.is_finale {
        return Err(StorageError::state_conflict(format!(
            "Round {round_id} is not a finale round; winners cannot be selected"
        )));
    }

    // round_participation_id -> has a non-null score
    let scored: HashMap<i64, bool> = sqlx::query_as::<_, (i64, Option<f64>)>(
        r#"
        SELECT rp.round_participation_id, rs.score
        FROM round_participations rp
        LEFT JOIN round_scores rs ON rs.round_participation_id = rp.round_participation_id
        WHERE rp.round_id = ?
        "#,
    )
    .bind(round_id)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|(rp_id, score)| (rp_id, score.is_some()))
    .collect();

    for selection in &req.winners {
        match scored.get(&selection.round_participation_id) {
            None => {
                return Err(StorageError::validation(format!(
                    "Round participation {} is not part of round {round_id}",
                    selection.round_participation_id
                )));
            }
            Some(false) => {
                return Err(StorageError::validation(format!(
                    "Round participation {} has no score and cannot be a winner",
                    selection.round_participation_id
                )));
            }
            Some(true) => {}
        }
    }

    sqlx::query(
        "UPDATE round_scores SET is_winner = 0, winner_position = NULL WHERE round_id = ?",
    )
    .bind(round_id)
    .execute(&mut *tx)
    .await?;

    for selection in &req.winners {
        sqlx::query(
            r#"
            UPDATE round_scores
            SET is_winner = 1, winner_position = ?, updated_at = datetime('now')
            WHERE round_participation_id = ?
            "#,
        )
        .bind(selection.position)
        .bind(selection.round_participation_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(round_id, selected = req.winners.len(), "winner set replaced");

    Ok(SelectWinnersOutcome {
        selected: req.winners.len() as u64,
    })
}

#[derive(FromRow)]
struct AvailableWinnerRow {
    city_id: i64,
    city_name: String,
    participation_id: i64,
    full_name: String,
    score: f64,
    winner_position: Option<i64>,
    already_imported: bool,
}

/// Enumerate, per source city of the same competition, the winners of that
/// city's finale round ordered by score descending, flagging those already
/// present in the target round.
pub async fn available_winners(pool: &SqlitePool, target_round_id: i64) -> Result<Vec<CityWinners>> {
    let mut conn = pool.acquire().await?;
    let target = fetch_round(&mut *conn, target_round_id).await?;

    let rows = sqlx::query_as::<_, AvailableWinnerRow>(
        r#"
        SELECT c.city_id, c.name AS city_name, p.participation_id, p.full_name,
               rs.score, rs.winner_position,
               EXISTS(
                   SELECT 1 FROM round_participations t
                   WHERE t.round_id = ? AND t.participation_id = p.participation_id
               ) AS already_imported
        FROM rounds fr
        INNER JOIN cities c ON c.city_id = fr.city_id
        INNER JOIN round_participations rp ON rp.round_id = fr.round_id
        INNER JOIN round_scores rs
            ON rs.round_participation_id = rp.round_participation_id
        INNER JOIN participations p ON p.participation_id = rp.participation_id
        WHERE fr.competition_id = ? AND fr.is_finale = 1 AND fr.city_id != ?
          AND rs.is_winner = 1 AND rs.score IS NOT NULL
        ORDER BY c.name, rs.score DESC, p.participation_id
        "#,
    )
    .bind(target_round_id)
    .bind(target.competition_id)
    .bind(target.city_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut cities: Vec<CityWinners> = Vec::new();
    for row in rows {
        if cities.last().map(|c| c.city_id) != Some(row.city_id) {
            cities.push(CityWinners {
                city_id: row.city_id,
                city_name: row.city_name.clone(),
                winners: Vec::new(),
            });
        }
        // push above guarantees a last element
        if let Some(city) = cities.last_mut() {
            city.winners.push(AvailableWinner {
                participation_id: row.participation_id,
                full_name: row.full_name,
                score: row.score,
                winner_position: row.winner_position,
                already_imported: row.already_imported,
            });
        }
    }

    Ok(cities)
}

/// Import a caller-chosen number of each city's finale winners into the
/// target round, `qualified_by = AUTOMATIC`. Participants already present are
/// skipped silently; the returned count is the number actually inserted.
pub async fn import_winners(
    pool: &SqlitePool,
    target_round_id: i64,
    req: &ImportWinnersRequest,
) -> Result<ImportWinnersOutcome> {
    if req.picks.is_empty() {
        return Err(StorageError::validation("At least one city must be selected"));
    }

    let mut tx = pool.begin().await?;

    // Re-validated inside the transaction so the inserts cannot race a
    // concurrent deletion of the target round.
    let target = fetch_round(&mut *tx, target_round_id).await?;

    let mut imported = 0u64;

    for pick in &req.picks {
        if pick.count < 1 {
            return Err(StorageError::validation(format!(
                "Import count for city {} must be at least 1",
                pick.city_id
            )));
        }

        let finale_round_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT round_id FROM rounds
            WHERE competition_id = ? AND city_id = ? AND is_finale = 1
            ORDER BY round_number DESC
            LIMIT 1
            "#,
        )
        .bind(target.competition_id)
        .bind(pick.city_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(finale_round_id) = finale_round_id else {
            return Err(StorageError::not_found(format!(
                "City {} has no finale round",
                pick.city_id
            )));
        };

        let winner_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT rp.participation_id
            FROM round_scores rs
            INNER JOIN round_participations rp
                ON rp.round_participation_id = rs.round_participation_id
            WHERE rs.round_id = ? AND rs.is_winner = 1 AND rs.score IS NOT NULL
            ORDER BY rs.score DESC, rp.participation_id
            LIMIT ?
            "#,
        )
        .bind(finale_round_id)
        .bind(pick.count)
        .fetch_all(&mut *tx)
        .await?;

        for participation_id in winner_ids {
            let result = sqlx::query(
                r#"
                INSERT INTO round_participations (round_id, participation_id, qualified_by)
                VALUES (?, ?, ?)
                ON CONFLICT (round_id, participation_id) DO NOTHING
                "#,
            )
            .bind(target_round_id)
            .bind(participation_id)
            .bind(qualified_by::AUTOMATIC)
            .execute(&mut *tx)
            .await?;

            imported += result.rows_affected();
        }
    }

    tx.commit().await?;

    info!(target_round_id, imported, "cross-city winners imported");

    Ok(ImportWinnersOutcome { imported })
}
