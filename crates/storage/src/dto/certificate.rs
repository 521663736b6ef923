use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::Certificate;

/// Generate certificates for a whole competition, optionally one city only
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateByCompetitionRequest {
    pub competition_id: i64,
    pub city_id: Option<i64>,
    pub template_id: i64,
}

/// Generate certificates for all participants of one round, or (on the
/// winners route) its winners only
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateByRoundRequest {
    pub round_id: i64,
    pub template_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateOutcome {
    pub created: u64,
    pub refreshed: u64,
}

/// Bulk scope for release/revoke. Exactly one of `certificate_ids`,
/// `round_id`, or `competition_id` must be given; `winners_only` narrows a
/// round scope to its winners and `template_id` narrows any scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CertificateScope {
    pub certificate_ids: Option<Vec<i64>>,
    pub round_id: Option<i64>,
    pub competition_id: Option<i64>,
    #[serde(default)]
    pub winners_only: bool,
    pub template_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevokeRequest {
    #[serde(flatten)]
    pub scope: CertificateScope,

    pub reason: String,
}

/// Reason for revoking a single certificate
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RevokeSingleRequest {
    #[validate(length(min = 1, max = 1024, message = "A revoke reason is required"))]
    pub reason: String,
}

/// Exact affected-row count of a bulk lifecycle operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AffectedRows {
    pub affected: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateResponse {
    pub certificate_id: i64,
    pub participation_id: i64,
    pub template_id: i64,
    pub status: String,
    pub revoke_reason: Option<String>,
    pub generated_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<Certificate> for CertificateResponse {
    fn from(c: Certificate) -> Self {
        Self {
            certificate_id: c.certificate_id,
            participation_id: c.participation_id,
            template_id: c.template_id,
            status: c.status,
            revoke_reason: c.revoke_reason,
            generated_at: c.generated_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PreviewQuery {
    pub participation_id: i64,
    pub template_id: i64,
}

/// Render payload for certificate preview. Assembled read-only; previewing
/// never creates or mutates a certificate row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificatePreview {
    pub participation_id: i64,
    pub template_id: i64,
    pub full_name: String,
    pub competition_name: String,
    pub city_name: String,
    pub result_status: Option<String>,
    pub position: Option<i64>,
    pub certificate_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    pub competition_id: Option<i64>,
    pub round_id: Option<i64>,
    pub template_id: Option<i64>,
}

/// On-demand certificate counts per status (replaces any client-side cache)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateSummary {
    pub total: i64,
    pub generated: i64,
    pub released: i64,
    pub revoked: i64,
}
