use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::dto::certificate::{
    AffectedRows, CertificatePreview, CertificateScope, GenerateByCompetitionRequest,
    GenerateByRoundRequest, GenerateOutcome, PreviewQuery, RevokeRequest, RevokeSingleRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{Certificate, certificate_status};
use crate::repository::certificate::CertificateRepository;
use crate::repository::city::CityRepository;
use crate::repository::competition::CompetitionRepository;
use crate::repository::participation::ParticipationRepository;

use super::score_ingestion::fetch_round;

/// Generate certificates for every participation of a competition, optionally
/// narrowed to one city. Re-running refreshes existing rows instead of
/// duplicating them; status and revoke reason are preserved across refreshes.
pub async fn generate_for_competition(
    pool: &SqlitePool,
    req: &GenerateByCompetitionRequest,
) -> Result<GenerateOutcome> {
    CompetitionRepository::new(pool)
        .find_by_id(req.competition_id)
        .await?;
    if let Some(city_id) = req.city_id {
        CityRepository::new(pool)
            .find_link(req.competition_id, city_id)
            .await?;
    }

    let mut tx = pool.begin().await?;

    let participation_ids: Vec<i64> = match req.city_id {
        Some(city_id) => {
            sqlx::query_scalar(
                "SELECT participation_id FROM participations WHERE competition_id = ? AND city_id = ?",
            )
            .bind(req.competition_id)
            .bind(city_id)
            .fetch_all(&mut *tx)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT participation_id FROM participations WHERE competition_id = ?",
            )
            .bind(req.competition_id)
            .fetch_all(&mut *tx)
            .await?
        }
    };

    let outcome = upsert_certificates(&mut *tx, &participation_ids, req.template_id).await?;

    tx.commit().await?;

    info!(
        competition_id = req.competition_id,
        created = outcome.created,
        refreshed = outcome.refreshed,
        "certificates generated for competition"
    );

    Ok(outcome)
}

/// Generate certificates for every participant of one round.
pub async fn generate_for_round(
    pool: &SqlitePool,
    req: &GenerateByRoundRequest,
) -> Result<GenerateOutcome> {
    generate_round_scoped(pool, req, false).await
}

/// Generate certificates for the selected winners of one round only.
pub async fn generate_for_winners(
    pool: &SqlitePool,
    req: &GenerateByRoundRequest,
) -> Result<GenerateOutcome> {
    generate_round_scoped(pool, req, true).await
}

async fn generate_round_scoped(
    pool: &SqlitePool,
    req: &GenerateByRoundRequest,
    winners_only: bool,
) -> Result<GenerateOutcome> {
    let mut tx = pool.begin().await?;

    fetch_round(&mut *tx, req.round_id).await?;

    let participation_ids: Vec<i64> = if winners_only {
        sqlx::query_scalar(
            r#"
            SELECT rp.participation_id
            FROM round_scores rs
            INNER JOIN round_participations rp
                ON rp.round_participation_id = rs.round_participation_id
            WHERE rs.round_id = ? AND rs.is_winner = 1
            "#,
        )
        .bind(req.round_id)
        .fetch_all(&mut *tx)
        .await?
    } else {
        sqlx::query_scalar(
            "SELECT participation_id FROM round_participations WHERE round_id = ?",
        )
        .bind(req.round_id)
        .fetch_all(&mut *tx)
        .await?
    };

    if winners_only && participation_ids.is_empty() {
        return Err(StorageError::state_conflict(format!(
            "Round {} has no winners selected",
            req.round_id
        )));
    }

    let outcome = upsert_certificates(&mut *tx, &participation_ids, req.template_id).await?;

    tx.commit().await?;

    info!(
        round_id = req.round_id,
        winners_only,
        created = outcome.created,
        refreshed = outcome.refreshed,
        "certificates generated for round"
    );

    Ok(outcome)
}

async fn upsert_certificates(
    conn: &mut SqliteConnection,
    participation_ids: &[i64],
    template_id: i64,
) -> Result<GenerateOutcome> {
    let mut outcome = GenerateOutcome {
        created: 0,
        refreshed: 0,
    };

    for participation_id in participation_ids {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT certificate_id FROM certificates WHERE participation_id = ? AND template_id = ?",
        )
        .bind(participation_id)
        .bind(template_id)
        .fetch_optional(&mut *conn)
        .await?;

        match existing {
            Some(certificate_id) => {
                sqlx::query(
                    "UPDATE certificates SET updated_at = datetime('now') WHERE certificate_id = ?",
                )
                .bind(certificate_id)
                .execute(&mut *conn)
                .await?;
                outcome.refreshed += 1;
            }
            None => {
                sqlx::query(
                    "INSERT INTO certificates (participation_id, template_id, status) VALUES (?, ?, ?)",
                )
                .bind(participation_id)
                .bind(template_id)
                .bind(certificate_status::GENERATED)
                .execute(&mut *conn)
                .await?;
                outcome.created += 1;
            }
        }
    }

    Ok(outcome)
}

/// Release one certificate. Valid from GENERATED and from REVOKED (re-release
/// clears the revoke reason); releasing an already-released certificate is a
/// conflict.
pub async fn release_one(pool: &SqlitePool, certificate_id: i64) -> Result<Certificate> {
    let repo = CertificateRepository::new(pool);
    let certificate = repo.find_by_id(certificate_id).await?;

    if certificate.status == certificate_status::RELEASED {
        return Err(StorageError::state_conflict(format!(
            "Certificate {certificate_id} is already released"
        )));
    }

    sqlx::query(
        r#"
        UPDATE certificates
        SET status = ?, revoke_reason = NULL, updated_at = datetime('now')
        WHERE certificate_id = ?
        "#,
    )
    .bind(certificate_status::RELEASED)
    .bind(certificate_id)
    .execute(pool)
    .await?;

    repo.find_by_id(certificate_id).await
}

/// Revoke one released certificate, recording the mandatory reason.
pub async fn revoke_one(
    pool: &SqlitePool,
    certificate_id: i64,
    req: &RevokeSingleRequest,
) -> Result<Certificate> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(StorageError::validation("A revoke reason is required"));
    }

    let repo = CertificateRepository::new(pool);
    let certificate = repo.find_by_id(certificate_id).await?;

    if certificate.status != certificate_status::RELEASED {
        return Err(StorageError::state_conflict(format!(
            "Certificate {certificate_id} is {} and only released certificates can be revoked",
            certificate.status
        )));
    }

    sqlx::query(
        r#"
        UPDATE certificates
        SET status = ?, revoke_reason = ?, updated_at = datetime('now')
        WHERE certificate_id = ?
        "#,
    )
    .bind(certificate_status::REVOKED)
    .bind(reason)
    .bind(certificate_id)
    .execute(pool)
    .await?;

    warn!(certificate_id, reason, "certificate revoked");

    repo.find_by_id(certificate_id).await
}

/// Bulk release over a scope. Certificates already released are left alone;
/// the returned count is the number of rows actually transitioned.
pub async fn release_scope(pool: &SqlitePool, scope: &CertificateScope) -> Result<AffectedRows> {
    let mut query = QueryBuilder::<Sqlite>::new("UPDATE certificates SET status = ");
    query.push_bind(certificate_status::RELEASED);
    query.push(", revoke_reason = NULL, updated_at = datetime('now') WHERE status IN (");
    query.push_bind(certificate_status::GENERATED);
    query.push(", ");
    query.push_bind(certificate_status::REVOKED);
    query.push(")");
    push_scope(&mut query, scope)?;

    let result = query.build().execute(pool).await?;

    info!(affected = result.rows_affected(), "certificates released");

    Ok(AffectedRows {
        affected: result.rows_affected(),
    })
}

/// Bulk revoke over a scope, released certificates only, one shared reason.
pub async fn revoke_scope(pool: &SqlitePool, req: &RevokeRequest) -> Result<AffectedRows> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(StorageError::validation("A revoke reason is required"));
    }

    let mut query = QueryBuilder::<Sqlite>::new("UPDATE certificates SET status = ");
    query.push_bind(certificate_status::REVOKED);
    query.push(", revoke_reason = ");
    query.push_bind(reason);
    query.push(", updated_at = datetime('now') WHERE status = ");
    query.push_bind(certificate_status::RELEASED);
    push_scope(&mut query, &req.scope)?;

    let result = query.build().execute(pool).await?;

    warn!(affected = result.rows_affected(), reason, "certificates revoked");

    Ok(AffectedRows {
        affected: result.rows_affected(),
    })
}

fn push_scope<'a>(
    query: &mut QueryBuilder<'a, Sqlite>,
    scope: &'a CertificateScope,
) -> Result<()> {
    let chosen = [
        scope.certificate_ids.is_some(),
        scope.round_id.is_some(),
        scope.competition_id.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    if chosen != 1 {
        return Err(StorageError::validation(
            "Exactly one of certificate_ids, round_id, or competition_id must be provided",
        ));
    }
    if scope.winners_only && scope.round_id.is_none() {
        return Err(StorageError::validation(
            "winners_only requires a round_id scope",
        ));
    }

    if let Some(ids) = &scope.certificate_ids {
        if ids.is_empty() {
            return Err(StorageError::validation("certificate_ids must not be empty"));
        }
        query.push(" AND certificate_id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        query.push(")");
    }

    if let Some(round_id) = scope.round_id {
        if scope.winners_only {
            query.push(
                r#" AND participation_id IN (
                    SELECT rp.participation_id
                    FROM round_scores rs
                    INNER JOIN round_participations rp
                        ON rp.round_participation_id = rs.round_participation_id
                    WHERE rs.round_id = "#,
            );
            query.push_bind(round_id);
            query.push(" AND rs.is_winner = 1)");
        } else {
            query.push(
                " AND participation_id IN (SELECT participation_id FROM round_participations WHERE round_id = ",
            );
            query.push_bind(round_id);
            query.push(")");
        }
    }

    if let Some(competition_id) = scope.competition_id {
        query.push(
            " AND participation_id IN (SELECT participation_id FROM participations WHERE competition_id = ",
        );
        query.push_bind(competition_id);
        query.push(")");
    }

    if let Some(template_id) = scope.template_id {
        query.push(" AND template_id = ");
        query.push_bind(template_id);
    }

    Ok(())
}

/// Assemble the render payload for one (participation, template) pair without
/// touching the certificates table.
pub async fn preview(pool: &SqlitePool, query: &PreviewQuery) -> Result<CertificatePreview> {
    let participation = ParticipationRepository::new(pool)
        .find_by_id(query.participation_id)
        .await?;
    let competition = CompetitionRepository::new(pool)
        .find_by_id(participation.competition_id)
        .await?;
    let city = CityRepository::new(pool)
        .find_by_id(participation.city_id)
        .await?;

    let result: Option<(String, Option<i64>)> = sqlx::query_as(
        "SELECT result_status, position FROM results WHERE participation_id = ?",
    )
    .bind(query.participation_id)
    .fetch_optional(pool)
    .await?;

    let certificate_status: Option<String> = sqlx::query_scalar(
        "SELECT status FROM certificates WHERE participation_id = ? AND template_id = ?",
    )
    .bind(query.participation_id)
    .bind(query.template_id)
    .fetch_optional(pool)
    .await?;

    let (result_status, position) = match result {
        Some((status, position)) => (Some(status), position),
        None => (None, None),
    };

    Ok(CertificatePreview {
        participation_id: query.participation_id,
        template_id: query.template_id,
        full_name: participation.full_name,
        competition_name: competition.name,
        city_name: city.name,
        result_status,
        position,
        certificate_status,
    })
}
