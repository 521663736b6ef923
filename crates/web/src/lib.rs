use axum::{Json, Router, routing::get};
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::competitions::handlers::list_competitions,
        features::competitions::handlers::get_competition,
        features::competitions::handlers::create_competition,
        features::competitions::handlers::update_competition,
        features::competitions::handlers::delete_competition,
        features::competitions::handlers::list_cities,
        features::competitions::handlers::create_city,
        features::competitions::handlers::list_competition_cities,
        features::competitions::handlers::attach_city,
        features::competitions::handlers::create_round,
        features::competitions::handlers::city_status,
        features::competitions::handlers::finish_city,
        features::competitions::handlers::reopen_city,
        features::competitions::handlers::register_participation,
        features::competitions::handlers::list_participations,
        features::rounds::handlers::get_round,
        features::rounds::handlers::update_round,
        features::rounds::handlers::delete_round,
        features::rounds::handlers::archive_round,
        features::rounds::handlers::unarchive_round,
        features::rounds::handlers::upload_score_batch,
        features::rounds::handlers::update_score,
        features::rounds::handlers::clear_scores,
        features::rounds::handlers::promote_top,
        features::rounds::handlers::promote_participant,
        features::rounds::handlers::add_participant,
        features::rounds::handlers::remove_participant,
        features::rounds::handlers::eligible_participants,
        features::rounds::handlers::leaderboard,
        features::rounds::handlers::select_winners,
        features::rounds::handlers::available_winners,
        features::rounds::handlers::import_winners,
        features::certificates::handlers::generate_for_competition,
        features::certificates::handlers::generate_for_round,
        features::certificates::handlers::generate_for_winners,
        features::certificates::handlers::release_one,
        features::certificates::handlers::revoke_one,
        features::certificates::handlers::release_scope,
        features::certificates::handlers::revoke_scope,
        features::certificates::handlers::preview,
        features::certificates::handlers::summary,
        features::certificates::handlers::delete_certificate,
    ),
    components(
        schemas(
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::UpdateCompetitionRequest,
            storage::dto::competition::CompetitionResponse,
            storage::dto::city::CreateCityRequest,
            storage::dto::city::AttachCityRequest,
            storage::dto::city::CompetitionCityResponse,
            storage::dto::city_status::CityStatusResponse,
            storage::dto::participation::RegisterParticipationRequest,
            storage::dto::participation::ParticipationResponse,
            storage::dto::round::CreateRoundRequest,
            storage::dto::round::UpdateRoundRequest,
            storage::dto::round::RoundResponse,
            storage::dto::round::RoundDetailResponse,
            storage::dto::round::RoundParticipantDetail,
            storage::dto::round::AddParticipantRequest,
            storage::dto::round::PromoteRequest,
            storage::dto::round::PromoteParticipantRequest,
            storage::dto::round::PromotionOutcome,
            storage::dto::round::LeaderboardEntry,
            storage::dto::round::EligibleParticipant,
            storage::dto::score::ScoreBatchEntry,
            storage::dto::score::ScoreBatchRequest,
            storage::dto::score::ScoreBatchOutcome,
            storage::dto::score::UpdateScoreRequest,
            storage::dto::score::ClearScoresOutcome,
            storage::dto::winners::WinnerSelection,
            storage::dto::winners::SelectWinnersRequest,
            storage::dto::winners::SelectWinnersOutcome,
            storage::dto::winners::AvailableWinner,
            storage::dto::winners::CityWinners,
            storage::dto::winners::CityWinnerPick,
            storage::dto::winners::ImportWinnersRequest,
            storage::dto::winners::ImportWinnersOutcome,
            storage::dto::certificate::GenerateByCompetitionRequest,
            storage::dto::certificate::GenerateByRoundRequest,
            storage::dto::certificate::GenerateOutcome,
            storage::dto::certificate::CertificateScope,
            storage::dto::certificate::RevokeRequest,
            storage::dto::certificate::RevokeSingleRequest,
            storage::dto::certificate::AffectedRows,
            storage::dto::certificate::CertificateResponse,
            storage::dto::certificate::CertificatePreview,
            storage::dto::certificate::CertificateSummary,
            storage::models::Competition,
            storage::models::City,
            storage::models::CompetitionCity,
            storage::models::Participation,
            storage::models::Round,
            storage::models::RoundParticipation,
            storage::models::RoundScore,
            storage::models::CompetitionResult,
            storage::models::Certificate,
        )
    ),
    tags(
        (name = "competitions", description = "Competition management"),
        (name = "cities", description = "Cities and per-city completion"),
        (name = "participations", description = "Participant registration"),
        (name = "rounds", description = "Round lifecycle and membership"),
        (name = "scores", description = "Score ingestion and ranking"),
        (name = "promotion", description = "Round-to-round promotion"),
        (name = "winners", description = "Winner selection and cross-city import"),
        (name = "certificates", description = "Certificate issuance lifecycle"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Assemble the full application router. Exposed so integration tests can
/// drive the API without binding a socket.
pub fn build_router(db: Database, api_keys: ApiKeys) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api/competitions", features::competitions::routes::routes(api_keys.clone()))
        .nest("/api/cities", features::competitions::routes::city_routes(api_keys.clone()))
        .nest("/api/rounds", features::rounds::routes::routes(api_keys.clone()))
        .nest("/api/certificates", features::certificates::routes::routes(api_keys))
        .layer(CorsLayer::permissive())
        .with_state(db)
}
