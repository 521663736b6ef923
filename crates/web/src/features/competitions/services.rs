use sqlx::SqlitePool;
use storage::{
    dto::city::{AttachCityRequest, CompetitionCityResponse},
    dto::city_status::CityStatusResponse,
    dto::competition::{CreateCompetitionRequest, UpdateCompetitionRequest},
    dto::participation::RegisterParticipationRequest,
    dto::round::CreateRoundRequest,
    error::Result,
    models::{City, Competition, CompetitionCity, Participation, Round},
    repository::city::CityRepository,
    repository::competition::CompetitionRepository,
    repository::participation::ParticipationRepository,
    repository::round::RoundRepository,
    services::city_completion,
};

/// List all competitions
pub async fn list_competitions(pool: &SqlitePool) -> Result<Vec<Competition>> {
    let repo = CompetitionRepository::new(pool);
    repo.list().await
}

pub async fn get_competition(pool: &SqlitePool, id: i64) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.find_by_id(id).await
}

pub async fn create_competition(
    pool: &SqlitePool,
    request: &CreateCompetitionRequest,
) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.create(request).await
}

pub async fn update_competition(
    pool: &SqlitePool,
    id: i64,
    request: &UpdateCompetitionRequest,
) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);
    repo.update(id, request).await
}

pub async fn delete_competition(pool: &SqlitePool, id: i64) -> Result<()> {
    let repo = CompetitionRepository::new(pool);
    repo.delete(id).await
}

/// List all cities
pub async fn list_cities(pool: &SqlitePool) -> Result<Vec<City>> {
    let repo = CityRepository::new(pool);
    repo.list().await
}

pub async fn create_city(pool: &SqlitePool, name: &str) -> Result<City> {
    let repo = CityRepository::new(pool);
    repo.create(name).await
}

/// Cities attached to a competition, with their completion flags
pub async fn list_competition_cities(
    pool: &SqlitePool,
    competition_id: i64,
) -> Result<Vec<CompetitionCityResponse>> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;
    CityRepository::new(pool)
        .list_for_competition(competition_id)
        .await
}

pub async fn attach_city(
    pool: &SqlitePool,
    competition_id: i64,
    request: &AttachCityRequest,
) -> Result<CompetitionCity> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;
    CityRepository::new(pool).find_by_id(request.city_id).await?;
    CityRepository::new(pool)
        .attach_to_competition(competition_id, request.city_id, request.event_date)
        .await
}

pub async fn create_round(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
    request: &CreateRoundRequest,
) -> Result<Round> {
    RoundRepository::new(pool)
        .create(competition_id, city_id, request)
        .await
}

pub async fn city_status(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
) -> Result<CityStatusResponse> {
    city_completion::city_status(pool, competition_id, city_id).await
}

pub async fn finish_city(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
) -> Result<CityStatusResponse> {
    city_completion::mark_city_finished(pool, competition_id, city_id).await
}

pub async fn reopen_city(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: i64,
) -> Result<CityStatusResponse> {
    city_completion::reopen_city(pool, competition_id, city_id).await
}

pub async fn register_participation(
    pool: &SqlitePool,
    competition_id: i64,
    request: &RegisterParticipationRequest,
) -> Result<Participation> {
    ParticipationRepository::new(pool)
        .register(competition_id, request)
        .await
}

pub async fn list_participations(
    pool: &SqlitePool,
    competition_id: i64,
    city_id: Option<i64>,
) -> Result<Vec<Participation>> {
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;
    ParticipationRepository::new(pool)
        .list_for_competition(competition_id, city_id)
        .await
}
