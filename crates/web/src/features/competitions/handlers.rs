use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::{
    Database,
    dto::city::{AttachCityRequest, CompetitionCityResponse, CreateCityRequest},
    dto::city_status::CityStatusResponse,
    dto::competition::{CompetitionResponse, CreateCompetitionRequest, UpdateCompetitionRequest},
    dto::participation::{ParticipationResponse, RegisterParticipationRequest},
    dto::round::{CreateRoundRequest, RoundResponse},
    models::City,
};
use utoipa::IntoParams;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ParticipationFilter {
    pub city_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "List all competitions", body = Vec<CompetitionResponse>)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(
    State(db): State<Database>,
) -> Result<Json<Vec<CompetitionResponse>>, WebError> {
    let competitions = services::list_competitions(db.pool()).await?;

    let response: Vec<CompetitionResponse> = competitions
        .into_iter()
        .map(CompetitionResponse::from)
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition found", body = CompetitionResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let competition = services::get_competition(db.pool(), id).await?;

    Ok(Json(CompetitionResponse::from(competition)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions",
    request_body = CreateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(db): State<Database>,
    Json(req): Json<CreateCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competition = services::create_competition(db.pool(), &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::from(competition)),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{id}",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    request_body = UpdateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn update_competition(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(update_req): Json<UpdateCompetitionRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_competition(db.pool(), id, &update_req).await?;

    Ok(Json(CompetitionResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitions/{id}",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn delete_competition(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    services::delete_competition(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/cities",
    responses(
        (status = 200, description = "List all cities", body = Vec<City>)
    ),
    tag = "cities"
)]
pub async fn list_cities(State(db): State<Database>) -> Result<Json<Vec<City>>, WebError> {
    let cities = services::list_cities(db.pool()).await?;

    Ok(Json(cities))
}

#[utoipa::path(
    post,
    path = "/api/cities",
    request_body = CreateCityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "City created", body = City),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "City name already exists")
    ),
    tag = "cities"
)]
pub async fn create_city(
    State(db): State<Database>,
    Json(req): Json<CreateCityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let city = services::create_city(db.pool(), &req.name).await?;

    Ok((StatusCode::CREATED, Json(city)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}/cities",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Cities attached to the competition", body = Vec<CompetitionCityResponse>),
        (status = 404, description = "Competition not found")
    ),
    tag = "cities"
)]
pub async fn list_competition_cities(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CompetitionCityResponse>>, WebError> {
    let cities = services::list_competition_cities(db.pool(), id).await?;

    Ok(Json(cities))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/cities",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    request_body = AttachCityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "City attached to the competition"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition or city not found"),
        (status = 409, description = "City already attached")
    ),
    tag = "cities"
)]
pub async fn attach_city(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<AttachCityRequest>,
) -> Result<Response, WebError> {
    let link = services::attach_city(db.pool(), id, &req).await?;

    Ok((StatusCode::CREATED, Json(link)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/cities/{city_id}/rounds",
    params(
        ("id" = i64, Path, description = "Competition id"),
        ("city_id" = i64, Path, description = "City id")
    ),
    request_body = CreateRoundRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Round created with a server-assigned round number", body = RoundResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "City not attached to the competition")
    ),
    tag = "rounds"
)]
pub async fn create_round(
    State(db): State<Database>,
    Path((id, city_id)): Path<(i64, i64)>,
    Json(req): Json<CreateRoundRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let round = services::create_round(db.pool(), id, city_id, &req).await?;

    Ok((StatusCode::CREATED, Json(RoundResponse::from(round))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}/cities/{city_id}/status",
    params(
        ("id" = i64, Path, description = "Competition id"),
        ("city_id" = i64, Path, description = "City id")
    ),
    responses(
        (status = 200, description = "Completion flags for the city", body = CityStatusResponse),
        (status = 404, description = "City not attached to the competition")
    ),
    tag = "cities"
)]
pub async fn city_status(
    State(db): State<Database>,
    Path((id, city_id)): Path<(i64, i64)>,
) -> Result<Json<CityStatusResponse>, WebError> {
    let status = services::city_status(db.pool(), id, city_id).await?;

    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/cities/{city_id}/finish",
    params(
        ("id" = i64, Path, description = "Competition id"),
        ("city_id" = i64, Path, description = "City id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "City marked finished and results materialized", body = CityStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "City not attached to the competition"),
        (status = 409, description = "Finale missing or has no winners")
    ),
    tag = "cities"
)]
pub async fn finish_city(
    State(db): State<Database>,
    Path((id, city_id)): Path<(i64, i64)>,
) -> Result<Json<CityStatusResponse>, WebError> {
    let status = services::finish_city(db.pool(), id, city_id).await?;

    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/cities/{city_id}/reopen",
    params(
        ("id" = i64, Path, description = "Competition id"),
        ("city_id" = i64, Path, description = "City id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "City reopened and its results deleted", body = CityStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "City not attached to the competition")
    ),
    tag = "cities"
)]
pub async fn reopen_city(
    State(db): State<Database>,
    Path((id, city_id)): Path<(i64, i64)>,
) -> Result<Json<CityStatusResponse>, WebError> {
    let status = services::reopen_city(db.pool(), id, city_id).await?;

    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{id}/participations",
    params(
        ("id" = i64, Path, description = "Competition id")
    ),
    request_body = RegisterParticipationRequest,
    responses(
        (status = 201, description = "Participation registered", body = ParticipationResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Competition or city not found"),
        (status = 409, description = "Already registered or registration closed")
    ),
    tag = "participations"
)]
pub async fn register_participation(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(req): Json<RegisterParticipationRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let participation = services::register_participation(db.pool(), id, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ParticipationResponse::from(participation)),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}/participations",
    params(
        ("id" = i64, Path, description = "Competition id"),
        ParticipationFilter
    ),
    responses(
        (status = 200, description = "Participations of the competition", body = Vec<ParticipationResponse>),
        (status = 404, description = "Competition not found")
    ),
    tag = "participations"
)]
pub async fn list_participations(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Query(filter): Query<ParticipationFilter>,
) -> Result<Json<Vec<ParticipationResponse>>, WebError> {
    let participations = services::list_participations(db.pool(), id, filter.city_id).await?;

    let response: Vec<ParticipationResponse> = participations
        .into_iter()
        .map(ParticipationResponse::from)
        .collect();

    Ok(Json(response))
}
