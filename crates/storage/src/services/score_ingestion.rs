use std::collections::{HashMap, HashSet};

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::dto::score::{
    ClearScoresOutcome, MAX_BATCH_SIZE, ScoreBatchOutcome, ScoreBatchRequest, UpdateScoreRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{Round, round_status};

/// Apply a bulk score upload to a round.
///
/// Rows that cannot be applied (malformed score, participant not registered in
/// the round, duplicate within the batch) are collected as per-row errors and
/// never abort the batch. Rows whose participant already has a score are
/// skipped, which makes re-uploading the same file safe. Ranks are recomputed
/// once for the whole round after the batch, inside the same transaction.
pub async fn upload_score_batch(
    pool: &SqlitePool,
    round_id: i64,
    req: &ScoreBatchRequest,
) -> Result<ScoreBatchOutcome> {
    if req.entries.is_empty() {
        return Err(StorageError::validation("Score batch is empty"));
    }
    if req.entries.len() > MAX_BATCH_SIZE {
        return Err(StorageError::validation(format!(
            "Score batch exceeds {MAX_BATCH_SIZE} entries"
        )));
    }

    let mut tx = pool.begin().await?;

    let round = fetch_round(&mut *tx, round_id).await?;
    if round.status == round_status::ARCHIVED {
        return Err(StorageError::state_conflict(format!(
            "Round {round_id} is archived and cannot accept scores"
        )));
    }

    // participation_id -> (round_participation_id, already scored)
    let registered: HashMap<i64, (i64, bool)> = sqlx::query_as::<_, (i64, i64, Option<f64>)>(
        r#"
        SELECT rp.participation_id, rp.round_participation_id, rs.score
        FROM round_participations rp
        LEFT JOIN round_scores rs ON rs.round_participation_id = rp.round_participation_id
        WHERE rp.round_id = ?
        "#,
    )
    .bind(round_id)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(|(participation_id, rp_id, score)| (participation_id, (rp_id, score.is_some())))
    .collect();

    let mut outcome = ScoreBatchOutcome::default();
    let mut seen: HashSet<i64> = HashSet::new();

    for (idx, entry) in req.entries.iter().enumerate() {
        let row = idx + 1;

        if !seen.insert(entry.participation_id) {
            outcome.failed += 1;
            outcome.errors.push(format!(
                "row {row}: participation {} appears more than once in the batch",
                entry.participation_id
            ));
            continue;
        }

        let Some(&(round_participation_id, already_scored)) =
            registered.get(&entry.participation_id)
        else {
            outcome.failed += 1;
            outcome.errors.push(format!(
                "row {row}: participation {} is not registered in round {round_id}",
                entry.participation_id
            ));
            continue;
        };

        let score: f64 = match entry.score.trim().parse() {
            Ok(value) if f64::is_finite(value) => value,
            _ => {
                outcome.failed += 1;
                outcome
                    .errors
                    .push(format!("row {row}: malformed score '{}'", entry.score));
                continue;
            }
        };

        if already_scored {
            outcome.skipped += 1;
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO round_scores (round_participation_id, round_id, score, notes)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (round_participation_id) DO UPDATE
            SET score = excluded.score, notes = excluded.notes, updated_at = datetime('now')
            "#,
        )
        .bind(round_participation_id)
        .bind(round_id)
        .bind(score)
        .bind(&entry.notes)
        .execute(&mut *tx)
        .await?;

        outcome.success += 1;
    }

    if outcome.success > 0 {
        super::ranking::recompute_round_ranks(&mut *tx, round_id).await?;
    }

    tx.commit().await?;

    info!(
        round_id,
        success = outcome.success,
        skipped = outcome.skipped,
        failed = outcome.failed,
        "score batch applied"
    );

    Ok(outcome)
}

/// Upsert or clear a single score and recompute the round's ranks.
pub async fn update_score(
    pool: &SqlitePool,
    round_id: i64,
    round_participation_id: i64,
    req: &UpdateScoreRequest,
) -> Result<()> {
    if let Some(score) = req.score {
        if !score.is_finite() {
            return Err(StorageError::validation("Score must be a finite number"));
        }
    }

    let mut tx = pool.begin().await?;

    let round = fetch_round(&mut *tx, round_id).await?;
    if round.status == round_status::ARCHIVED {
        return Err(StorageError::state_conflict(format!(
            "Round {round_id} is archived and cannot accept scores"
        )));
    }

    let belongs: Option<i64> = sqlx::query_scalar(
        "SELECT round_id FROM round_participations WHERE round_participation_id = ?",
    )
    .bind(round_participation_id)
    .fetch_optional(&mut *tx)
    .await?;

    match belongs {
        Some(id) if id == round_id => {}
        _ => {
            return Err(StorageError::not_found(format!(
                "Round participation {round_participation_id} does not belong to round {round_id}"
            )));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO round_scores (round_participation_id, round_id, score, notes)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (round_participation_id) DO UPDATE
        SET score = excluded.score, notes = excluded.notes, updated_at = datetime('now')
        "#,
    )
    .bind(round_participation_id)
    .bind(round_id)
    .bind(req.score)
    .bind(&req.notes)
    .execute(&mut *tx)
    .await?;

    super::ranking::recompute_round_ranks(&mut *tx, round_id).await?;

    tx.commit().await?;

    Ok(())
}

/// Delete every score row of a round in one step. Irreversible; the route is
/// restricted to privileged callers.
pub async fn clear_scores(pool: &SqlitePool, round_id: i64) -> Result<ClearScoresOutcome> {
    let mut tx = pool.begin().await?;

    fetch_round(&mut *tx, round_id).await?;

    let result = sqlx::query("DELETE FROM round_scores WHERE round_id = ?")
        .bind(round_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(round_id, deleted = result.rows_affected(), "scores cleared");

    Ok(ClearScoresOutcome {
        deleted: result.rows_affected(),
    })
}

pub(crate) async fn fetch_round(conn: &mut SqliteConnection, round_id: i64) -> Result<Round> {
    sqlx::query_as::<_, Round>(
        r#"
        SELECT round_id, competition_id, city_id, round_number, name, status,
               is_finale, created_at
        FROM rounds
        WHERE round_id = ?
        "#,
    )
    .bind(round_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| StorageError::not_found(format!("Round {round_id} does not exist")))
}
