use sqlx::SqlitePool;
use storage::{
    dto::certificate::{
        AffectedRows, CertificatePreview, CertificateScope, CertificateSummary,
        GenerateByCompetitionRequest, GenerateByRoundRequest, GenerateOutcome, PreviewQuery,
        RevokeRequest, RevokeSingleRequest, SummaryQuery,
    },
    error::Result,
    models::Certificate,
    repository::certificate::CertificateRepository,
    services::certificate_lifecycle,
};

pub async fn generate_for_competition(
    pool: &SqlitePool,
    request: &GenerateByCompetitionRequest,
) -> Result<GenerateOutcome> {
    certificate_lifecycle::generate_for_competition(pool, request).await
}

pub async fn generate_for_round(
    pool: &SqlitePool,
    request: &GenerateByRoundRequest,
) -> Result<GenerateOutcome> {
    certificate_lifecycle::generate_for_round(pool, request).await
}

pub async fn generate_for_winners(
    pool: &SqlitePool,
    request: &GenerateByRoundRequest,
) -> Result<GenerateOutcome> {
    certificate_lifecycle::generate_for_winners(pool, request).await
}

pub async fn release_one(pool: &SqlitePool, certificate_id: i64) -> Result<Certificate> {
    certificate_lifecycle::release_one(pool, certificate_id).await
}

pub async fn revoke_one(
    pool: &SqlitePool,
    certificate_id: i64,
    request: &RevokeSingleRequest,
) -> Result<Certificate> {
    certificate_lifecycle::revoke_one(pool, certificate_id, request).await
}

pub async fn release_scope(pool: &SqlitePool, scope: &CertificateScope) -> Result<AffectedRows> {
    certificate_lifecycle::release_scope(pool, scope).await
}

pub async fn revoke_scope(pool: &SqlitePool, request: &RevokeRequest) -> Result<AffectedRows> {
    certificate_lifecycle::revoke_scope(pool, request).await
}

pub async fn preview(pool: &SqlitePool, query: &PreviewQuery) -> Result<CertificatePreview> {
    certificate_lifecycle::preview(pool, query).await
}

pub async fn summary(pool: &SqlitePool, filter: &SummaryQuery) -> Result<CertificateSummary> {
    CertificateRepository::new(pool).summary(filter).await
}

pub async fn delete(pool: &SqlitePool, certificate_id: i64) -> Result<()> {
    CertificateRepository::new(pool).delete(certificate_id).await
}
