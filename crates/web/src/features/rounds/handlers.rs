use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::round::{
        AddParticipantRequest, EligibleParticipant, LeaderboardEntry, PromoteParticipantRequest,
        PromoteRequest, PromotionOutcome, RoundDetailResponse, RoundResponse, UpdateRoundRequest,
    },
    dto::score::{ClearScoresOutcome, ScoreBatchOutcome, ScoreBatchRequest, UpdateScoreRequest},
    dto::winners::{
        CityWinners, ImportWinnersOutcome, ImportWinnersRequest, SelectWinnersOutcome,
        SelectWinnersRequest,
    },
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rounds/{id}",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    responses(
        (status = 200, description = "Round with its participants and scores", body = RoundDetailResponse),
        (status = 404, description = "Round not found")
    ),
    tag = "rounds"
)]
pub async fn get_round(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<RoundDetailResponse>, WebError> {
    let detail = services::get_round_detail(db.pool(), id).await?;

    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/rounds/{id}",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    request_body = UpdateRoundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Round updated", body = RoundResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found")
    ),
    tag = "rounds"
)]
pub async fn update_round(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoundRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let round = services::update_round(db.pool(), id, &req).await?;

    Ok(Json(RoundResponse::from(round)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/rounds/{id}",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Round deleted along with its scores"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found")
    ),
    tag = "rounds"
)]
pub async fn delete_round(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    services::delete_round(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/archive",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Round archived", body = RoundResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found")
    ),
    tag = "rounds"
)]
pub async fn archive_round(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<RoundResponse>, WebError> {
    let round = services::archive_round(db.pool(), id).await?;

    Ok(Json(RoundResponse::from(round)))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/unarchive",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Round restored to COMPLETED", body = RoundResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found"),
        (status = 409, description = "Round is not archived")
    ),
    tag = "rounds"
)]
pub async fn unarchive_round(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<RoundResponse>, WebError> {
    let round = services::unarchive_round(db.pool(), id).await?;

    Ok(Json(RoundResponse::from(round)))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/scores/batch",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    request_body = ScoreBatchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Per-row outcome counts; failed rows never abort the batch", body = ScoreBatchOutcome),
        (status = 400, description = "Empty or oversized batch"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found"),
        (status = 409, description = "Round is archived")
    ),
    tag = "scores"
)]
pub async fn upload_score_batch(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<ScoreBatchRequest>,
) -> Result<Json<ScoreBatchOutcome>, WebError> {
    let outcome = services::upload_score_batch(db.pool(), id, &req).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    put,
    path = "/api/rounds/{id}/scores/{round_participation_id}",
    params(
        ("id" = i64, Path, description = "Round id"),
        ("round_participation_id" = i64, Path, description = "Round participation id")
    ),
    request_body = UpdateScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Score updated and ranks recomputed"),
        (status = 400, description = "Non-finite score"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participation not in this round"),
        (status = 409, description = "Round is archived")
    ),
    tag = "scores"
)]
pub async fn update_score(
    State(db): State<Database>,
    Path((id, round_participation_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateScoreRequest>,
) -> Result<Response, WebError> {
    services::update_score(db.pool(), id, round_participation_id, &req).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/scores/clear",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All scores of the round deleted", body = ClearScoresOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round not found")
    ),
    tag = "scores"
)]
pub async fn clear_scores(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<ClearScoresOutcome>, WebError> {
    let outcome = services::clear_scores(db.pool(), id).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/promote",
    params(
        ("id" = i64, Path, description = "Source round id")
    ),
    request_body = PromoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Top-N participants copied into the next round", body = PromotionOutcome),
        (status = 400, description = "Count out of bounds"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Next round does not exist"),
        (status = 409, description = "Nothing scored yet")
    ),
    tag = "promotion"
)]
pub async fn promote_top(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<PromoteRequest>,
) -> Result<Json<PromotionOutcome>, WebError> {
    let outcome = services::promote_top(db.pool(), id, req.count).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/promote-participant",
    params(
        ("id" = i64, Path, description = "Source round id")
    ),
    request_body = PromoteParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Single participant promoted out of ranking order", body = PromotionOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not in round or next round missing")
    ),
    tag = "promotion"
)]
pub async fn promote_participant(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<PromoteParticipantRequest>,
) -> Result<Json<PromotionOutcome>, WebError> {
    let outcome = services::promote_participant(db.pool(), id, req.participation_id).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/participants",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    request_body = AddParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Participant added to the round"),
        (status = 400, description = "Participation belongs to another competition"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Round or participation not found"),
        (status = 409, description = "Already in the round or round archived")
    ),
    tag = "rounds"
)]
pub async fn add_participant(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<AddParticipantRequest>,
) -> Result<Response, WebError> {
    let created = services::add_participant(db.pool(), id, req.participation_id).await?;

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/rounds/{id}/participants/{participation_id}",
    params(
        ("id" = i64, Path, description = "Round id"),
        ("participation_id" = i64, Path, description = "Participation id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Participant removed, score deleted, ranks recomputed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not in this round")
    ),
    tag = "rounds"
)]
pub async fn remove_participant(
    State(db): State<Database>,
    Path((id, participation_id)): Path<(i64, i64)>,
) -> Result<Response, WebError> {
    services::remove_participant(db.pool(), id, participation_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/rounds/{id}/eligible-participants",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    responses(
        (status = 200, description = "Participations of the round's city not yet in the round", body = Vec<EligibleParticipant>),
        (status = 404, description = "Round not found")
    ),
    tag = "rounds"
)]
pub async fn eligible_participants(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<EligibleParticipant>>, WebError> {
    let eligible = services::eligible_participants(db.pool(), id).await?;

    Ok(Json(eligible))
}

#[utoipa::path(
    get,
    path = "/api/rounds/{id}/leaderboard",
    params(
        ("id" = i64, Path, description = "Round id")
    ),
    responses(
        (status = 200, description = "Scored participants ordered by rank", body = Vec<LeaderboardEntry>),
        (status = 404, description = "Round not found")
    ),
    tag = "rounds"
)]
pub async fn leaderboard(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LeaderboardEntry>>, WebError> {
    let entries = services::leaderboard(db.pool(), id).await?;

    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/winners",
    params(
        ("id" = i64, Path, description = "Finale round id")
    ),
    request_body = SelectWinnersRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Winner set replaced", body = SelectWinnersOutcome),
        (status = 400, description = "Selection references an unscored participant"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Round is not a finale")
    ),
    tag = "winners"
)]
pub async fn select_winners(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<SelectWinnersRequest>,
) -> Result<Json<SelectWinnersOutcome>, WebError> {
    req.validate()?;

    let outcome = services::select_winners(db.pool(), id, &req).await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/rounds/{id}/available-winners",
    params(
        ("id" = i64, Path, description = "Target round id")
    ),
    responses(
        (status = 200, description = "Finale winners of other cities, grouped per city", body = Vec<CityWinners>),
        (status = 404, description = "Round not found")
    ),
    tag = "winners"
)]
pub async fn available_winners(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CityWinners>>, WebError> {
    let cities = services::available_winners(db.pool(), id).await?;

    Ok(Json(cities))
}

#[utoipa::path(
    post,
    path = "/api/rounds/{id}/import-winners",
    params(
        ("id" = i64, Path, description = "Target round id")
    ),
    request_body = ImportWinnersRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Cross-city winners imported into the target round", body = ImportWinnersOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "A selected city has no finale round")
    ),
    tag = "winners"
)]
pub async fn import_winners(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<ImportWinnersRequest>,
) -> Result<Json<ImportWinnersOutcome>, WebError> {
    req.validate()?;

    let outcome = services::import_winners(db.pool(), id, &req).await?;

    Ok(Json(outcome))
}
