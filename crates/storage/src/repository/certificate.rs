use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::dto::certificate::{CertificateSummary, SummaryQuery};
use crate::error::{Result, StorageError};
use crate::models::{Certificate, certificate_status};

/// Repository for Certificate database operations
pub struct CertificateRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CertificateRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Certificate> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            SELECT certificate_id, participation_id, template_id, status, revoke_reason,
                   generated_at, updated_at
            FROM certificates
            WHERE certificate_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found(format!("Certificate {id} does not exist")))?;

        Ok(certificate)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM certificates WHERE certificate_id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!(
                "Certificate {id} does not exist"
            )));
        }

        Ok(())
    }

    /// On-demand per-status counts; computed fresh on every call so no
    /// derived-count cache needs invalidating.
    pub async fn summary(&self, filter: &SummaryQuery) -> Result<CertificateSummary> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(status = "#,
        );
        query.push_bind(certificate_status::GENERATED);
        query.push("), 0) AS generated, COALESCE(SUM(status = ");
        query.push_bind(certificate_status::RELEASED);
        query.push("), 0) AS released, COALESCE(SUM(status = ");
        query.push_bind(certificate_status::REVOKED);
        query.push("), 0) AS revoked FROM certificates WHERE 1=1");

        if let Some(competition_id) = filter.competition_id {
            query.push(
                " AND participation_id IN (SELECT participation_id FROM participations WHERE competition_id = ",
            );
            query.push_bind(competition_id);
            query.push(")");
        }

        if let Some(round_id) = filter.round_id {
            query.push(
                " AND participation_id IN (SELECT participation_id FROM round_participations WHERE round_id = ",
            );
            query.push_bind(round_id);
            query.push(")");
        }

        if let Some(template_id) = filter.template_id {
            query.push(" AND template_id = ");
            query.push_bind(template_id);
        }

        let (total, generated, released, revoked): (i64, i64, i64, i64) = query
            .build_query_as()
            .fetch_one(self.pool)
            .await?;

        Ok(CertificateSummary {
            total,
            generated,
            released,
            revoked,
        })
    }
}
