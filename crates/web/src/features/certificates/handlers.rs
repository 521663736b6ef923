use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::certificate::{
        AffectedRows, CertificatePreview, CertificateResponse, CertificateScope,
        CertificateSummary, GenerateByCompetitionRequest, GenerateByRoundRequest, GenerateOutcome,
        PreviewQuery, RevokeRequest, RevokeSingleRequest, SummaryQuery,
    },
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/certificates/generate/competition",
    request_body = GenerateByCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Certificates generated for the competition, existing rows refreshed", body = GenerateOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition or city not found")
    ),
    tag = "certificates"
)]
pub async fn generate_for_competition(
    State(db): State<Database>,
    Json(req): Json<GenerateByCompetitionRequest>,
) -> Result<Json<GenerateOutcome>, WebError> {
    let outcome = services::generate_for_competition(db.pool(), &req).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/certificates/generate/round",
    request_body = GenerateByRoundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Certificates generated for every participant of the round", body = GenerateOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found")
    ),
    tag = "certificates"
)]
pub async fn generate_for_round(
    State(db): State<Database>,
    Json(req): Json<GenerateByRoundRequest>,
) -> Result<Json<GenerateOutcome>, WebError> {
    let outcome = services::generate_for_round(db.pool(), &req).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/certificates/generate/winners",
    request_body = GenerateByRoundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Certificates generated for the round's winners only", body = GenerateOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found"),
        (status = 409, description = "Round has no winners selected")
    ),
    tag = "certificates"
)]
pub async fn generate_for_winners(
    State(db): State<Database>,
    Json(req): Json<GenerateByRoundRequest>,
) -> Result<Json<GenerateOutcome>, WebError> {
    let outcome = services::generate_for_winners(db.pool(), &req).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/certificates/{id}/release",
    params(
        ("id" = i64, Path, description = "Certificate id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Certificate released", body = CertificateResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Certificate not found"),
        (status = 409, description = "Certificate is already released")
    ),
    tag = "certificates"
)]
pub async fn release_one(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<CertificateResponse>, WebError> {
    let certificate = services::release_one(db.pool(), id).await?;

    Ok(Json(CertificateResponse::from(certificate)))
}

#[utoipa::path(
    post,
    path = "/api/certificates/{id}/revoke",
    params(
        ("id" = i64, Path, description = "Certificate id")
    ),
    request_body = RevokeSingleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Certificate revoked", body = CertificateResponse),
        (status = 400, description = "Missing revoke reason"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Certificate not found"),
        (status = 409, description = "Only released certificates can be revoked")
    ),
    tag = "certificates"
)]
pub async fn revoke_one(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<RevokeSingleRequest>,
) -> Result<Json<CertificateResponse>, WebError> {
    req.validate()?;

    let certificate = services::revoke_one(db.pool(), id, &req).await?;

    Ok(Json(CertificateResponse::from(certificate)))
}

#[utoipa::path(
    post,
    path = "/api/certificates/release",
    request_body = CertificateScope,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bulk release; already-released rows are untouched", body = AffectedRows),
        (status = 400, description = "Invalid scope"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "certificates"
)]
pub async fn release_scope(
    State(db): State<Database>,
    Json(scope): Json<CertificateScope>,
) -> Result<Json<AffectedRows>, WebError> {
    let affected = services::release_scope(db.pool(), &scope).await?;

    Ok(Json(affected))
}

#[utoipa::path(
    post,
    path = "/api/certificates/revoke",
    request_body = RevokeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bulk revoke over released certificates", body = AffectedRows),
        (status = 400, description = "Invalid scope or missing reason"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "certificates"
)]
pub async fn revoke_scope(
    State(db): State<Database>,
    Json(req): Json<RevokeRequest>,
) -> Result<Json<AffectedRows>, WebError> {
    let affected = services::revoke_scope(db.pool(), &req).await?;

    Ok(Json(affected))
}

#[utoipa::path(
    get,
    path = "/api/certificates/preview",
    params(PreviewQuery),
    responses(
        (status = 200, description = "Render payload; no certificate row is created", body = CertificatePreview),
        (status = 404, description = "Participation not found")
    ),
    tag = "certificates"
)]
pub async fn preview(
    State(db): State<Database>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<CertificatePreview>, WebError> {
    let preview = services::preview(db.pool(), &query).await?;

    Ok(Json(preview))
}

#[utoipa::path(
    get,
    path = "/api/certificates/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-status certificate counts", body = CertificateSummary)
    ),
    tag = "certificates"
)]
pub async fn summary(
    State(db): State<Database>,
    Query(filter): Query<SummaryQuery>,
) -> Result<Json<CertificateSummary>, WebError> {
    let summary = services::summary(db.pool(), &filter).await?;

    Ok(Json(summary))
}

#[utoipa::path(
    delete,
    path = "/api/certificates/{id}",
    params(
        ("id" = i64, Path, description = "Certificate id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Certificate deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Certificate not found")
    ),
    tag = "certificates"
)]
pub async fn delete_certificate(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    services::delete(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
