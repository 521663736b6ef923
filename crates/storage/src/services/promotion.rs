use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::dto::round::PromotionOutcome;
use crate::error::{Result, StorageError};
use crate::models::{Round, RoundParticipation, qualified_by, round_status};

use super::score_ingestion::fetch_round;

/// Copy the top N ranked participants of a round into the next round of the
/// same city (round_number + 1).
///
/// The target round must already exist; it is never auto-created. Selection
/// orders by `rank_in_round` ascending with `participation_id` ascending as
/// the deterministic tie-break at the cutoff. Participants already present in
/// the target round are counted, not treated as errors, so repeated promotion
/// never produces duplicates.
pub async fn promote_top(pool: &SqlitePool, round_id: i64, count: i64) -> Result<PromotionOutcome> {
    let mut tx = pool.begin().await?;

    let source = fetch_round(&mut *tx, round_id).await?;
    let target = fetch_next_round(&mut *tx, &source).await?;

    let scored: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM round_scores WHERE round_id = ? AND score IS NOT NULL")
            .bind(round_id)
            .fetch_one(&mut *tx)
            .await?;

    if scored == 0 {
        return Err(StorageError::state_conflict(format!(
            "Round {round_id} has no scored participants to promote"
        )));
    }
    if count < 1 || count > scored {
        return Err(StorageError::validation(format!(
            "Promotion count must be between 1 and {scored}"
        )));
    }

    let selected: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT rp.participation_id
        FROM round_scores rs
        INNER JOIN round_participations rp
            ON rp.round_participation_id = rs.round_participation_id
        WHERE rs.round_id = ? AND rs.score IS NOT NULL
        ORDER BY rs.rank_in_round ASC, rp.participation_id ASC
        LIMIT ?
        "#,
    )
    .bind(round_id)
    .bind(count)
    .fetch_all(&mut *tx)
    .await?;

    let mut outcome = PromotionOutcome {
        promoted: 0,
        already_present: 0,
    };

    for participation_id in selected {
        if insert_automatic(&mut *tx, target.round_id, participation_id).await? {
            outcome.promoted += 1;
        } else {
            outcome.already_present += 1;
        }
    }

    tx.commit().await?;

    info!(
        source = round_id,
        target = target.round_id,
        promoted = outcome.promoted,
        "top-{count} promotion applied"
    );

    Ok(outcome)
}

/// Promote one participant out of ranking order. Bypasses the count bound but
/// still requires the target round to exist.
pub async fn promote_participant(
    pool: &SqlitePool,
    round_id: i64,
    participation_id: i64,
) -> Result<PromotionOutcome> {
    let mut tx = pool.begin().await?;

    let source = fetch_round(&mut *tx, round_id).await?;

    let in_source: Option<i64> = sqlx::query_scalar(
        "SELECT round_participation_id FROM round_participations WHERE round_id = ? AND participation_id = ?",
    )
    .bind(round_id)
    .bind(participation_id)
    .fetch_optional(&mut *tx)
    .await?;

    if in_source.is_none() {
        return Err(StorageError::not_found(format!(
            "Participation {participation_id} is not part of round {round_id}"
        )));
    }

    let target = fetch_next_round(&mut *tx, &source).await?;

    let inserted = insert_automatic(&mut *tx, target.round_id, participation_id).await?;

    tx.commit().await?;

    Ok(PromotionOutcome {
        promoted: u64::from(inserted),
        already_present: u64::from(!inserted),
    })
}

/// Add a participant to a round directly (`qualified_by = MANUAL`). The
/// participation must belong to the round's competition; the city may differ
/// so admins can seed a grand-finale round by hand.
pub async fn add_participant(
    pool: &SqlitePool,
    round_id: i64,
    participation_id: i64,
) -> Result<RoundParticipation> {
    let mut tx = pool.begin().await?;

    let round = fetch_round(&mut *tx, round_id).await?;
    if round.status == round_status::ARCHIVED {
        return Err(StorageError::state_conflict(format!(
            "Round {round_id} is archived"
        )));
    }

    let competition_id: Option<i64> =
        sqlx::query_scalar("SELECT competition_id FROM participations WHERE participation_id = ?")
            .bind(participation_id)
            .fetch_optional(&mut *tx)
            .await?;

    match competition_id {
        Some(id) if id == round.competition_id => {}
        Some(_) => {
            return Err(StorageError::validation(format!(
                "Participation {participation_id} belongs to a different competition"
            )));
        }
        None => {
            return Err(StorageError::not_found(format!(
                "Participation {participation_id} does not exist"
            )));
        }
    }

    let created = sqlx::query_as::<_, RoundParticipation>(
        r#"
        INSERT INTO round_participations (round_id, participation_id, qualified_by)
        VALUES (?, ?, ?)
        RETURNING round_participation_id, round_id, participation_id, qualified_by, created_at
        "#,
    )
    .bind(round_id)
    .bind(participation_id)
    .bind(qualified_by::MANUAL)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                return StorageError::ConstraintViolation(format!(
                    "Participation {participation_id} is already in round {round_id}"
                ));
            }
        }
        StorageError::from(e)
    })?;

    tx.commit().await?;

    Ok(created)
}

/// Remove a participant from one round, deleting that round's score for them
/// if present and recomputing the round's ranks. Other rounds are untouched.
pub async fn remove_participant(
    pool: &SqlitePool,
    round_id: i64,
    participation_id: i64,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let round_participation_id: Option<i64> = sqlx::query_scalar(
        "SELECT round_participation_id FROM round_participations WHERE round_id = ? AND participation_id = ?",
    )
    .bind(round_id)
    .bind(participation_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(round_participation_id) = round_participation_id else {
        return Err(StorageError::not_found(format!(
            "Participation {participation_id} is not part of round {round_id}"
        )));
    };

    sqlx::query("DELETE FROM round_scores WHERE round_participation_id = ?")
        .bind(round_participation_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM round_participations WHERE round_participation_id = ?")
        .bind(round_participation_id)
        .execute(&mut *tx)
        .await?;

    super::ranking::recompute_round_ranks(&mut *tx, round_id).await?;

    tx.commit().await?;

    Ok(())
}

/// The next round of the source's city, which must already exist. Looked up
/// on the same connection as the inserts so a concurrent deletion cannot
/// race past it.
async fn fetch_next_round(conn: &mut SqliteConnection, source: &Round) -> Result<Round> {
    let next_number = source.round_number + 1;

    sqlx::query_as::<_, Round>(
        r#"
        SELECT round_id, competition_id, city_id, round_number, name, status,
               is_finale, created_at
        FROM rounds
        WHERE competition_id = ? AND city_id = ? AND round_number = ?
        "#,
    )
    .bind(source.competition_id)
    .bind(source.city_id)
    .bind(next_number)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        StorageError::not_found(format!(
            "Round {next_number} does not exist for this city; create it before promoting"
        ))
    })
}

async fn insert_automatic(
    conn: &mut SqliteConnection,
    round_id: i64,
    participation_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO round_participations (round_id, participation_id, qualified_by)
        VALUES (?, ?, ?)
        ON CONFLICT (round_id, participation_id) DO NOTHING
        "#,
    )
    .bind(round_id)
    .bind(participation_id)
    .bind(qualified_by::AUTOMATIC)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
