use sqlx::SqlitePool;
use storage::{
    dto::round::{
        EligibleParticipant, LeaderboardEntry, PromotionOutcome, RoundDetailResponse,
        RoundResponse, UpdateRoundRequest,
    },
    dto::score::{ClearScoresOutcome, ScoreBatchOutcome, ScoreBatchRequest, UpdateScoreRequest},
    dto::winners::{
        CityWinners, ImportWinnersOutcome, ImportWinnersRequest, SelectWinnersOutcome,
        SelectWinnersRequest,
    },
    error::Result,
    models::{Round, RoundParticipation},
    repository::round::RoundRepository,
    services::{promotion, score_ingestion, winners},
};

/// Round plus its participant and score listing
pub async fn get_round_detail(pool: &SqlitePool, round_id: i64) -> Result<RoundDetailResponse> {
    let repo = RoundRepository::new(pool);
    let round = repo.find_by_id(round_id).await?;
    let participants = repo.list_participants(round_id).await?;

    Ok(RoundDetailResponse {
        round: RoundResponse::from(round),
        participants,
    })
}

pub async fn update_round(
    pool: &SqlitePool,
    round_id: i64,
    request: &UpdateRoundRequest,
) -> Result<Round> {
    RoundRepository::new(pool).update(round_id, request).await
}

pub async fn delete_round(pool: &SqlitePool, round_id: i64) -> Result<()> {
    RoundRepository::new(pool).delete(round_id).await
}

pub async fn archive_round(pool: &SqlitePool, round_id: i64) -> Result<Round> {
    RoundRepository::new(pool).archive(round_id).await
}

pub async fn unarchive_round(pool: &SqlitePool, round_id: i64) -> Result<Round> {
    RoundRepository::new(pool).unarchive(round_id).await
}

pub async fn upload_score_batch(
    pool: &SqlitePool,
    round_id: i64,
    request: &ScoreBatchRequest,
) -> Result<ScoreBatchOutcome> {
    score_ingestion::upload_score_batch(pool, round_id, request).await
}

pub async fn update_score(
    pool: &SqlitePool,
    round_id: i64,
    round_participation_id: i64,
    request: &UpdateScoreRequest,
) -> Result<()> {
    score_ingestion::update_score(pool, round_id, round_participation_id, request).await
}

pub async fn clear_scores(pool: &SqlitePool, round_id: i64) -> Result<ClearScoresOutcome> {
    score_ingestion::clear_scores(pool, round_id).await
}

pub async fn promote_top(
    pool: &SqlitePool,
    round_id: i64,
    count: i64,
) -> Result<PromotionOutcome> {
    promotion::promote_top(pool, round_id, count).await
}

pub async fn promote_participant(
    pool: &SqlitePool,
    round_id: i64,
    participation_id: i64,
) -> Result<PromotionOutcome> {
    promotion::promote_participant(pool, round_id, participation_id).await
}

pub async fn add_participant(
    pool: &SqlitePool,
    round_id: i64,
    participation_id: i64,
) -> Result<RoundParticipation> {
    promotion::add_participant(pool, round_id, participation_id).await
}

pub async fn remove_participant(
    pool: &SqlitePool,
    round_id: i64,
    participation_id: i64,
) -> Result<()> {
    promotion::remove_participant(pool, round_id, participation_id).await
}

pub async fn eligible_participants(
    pool: &SqlitePool,
    round_id: i64,
) -> Result<Vec<EligibleParticipant>> {
    RoundRepository::new(pool).eligible_participants(round_id).await
}

pub async fn leaderboard(pool: &SqlitePool, round_id: i64) -> Result<Vec<LeaderboardEntry>> {
    RoundRepository::new(pool).leaderboard(round_id).await
}

pub async fn select_winners(
    pool: &SqlitePool,
    round_id: i64,
    request: &SelectWinnersRequest,
) -> Result<SelectWinnersOutcome> {
    winners::select_winners(pool, round_id, request).await
}

pub async fn available_winners(pool: &SqlitePool, round_id: i64) -> Result<Vec<CityWinners>> {
    winners::available_winners(pool, round_id).await
}

pub async fn import_winners(
    pool: &SqlitePool,
    round_id: i64,
    request: &ImportWinnersRequest,
) -> Result<ImportWinnersOutcome> {
    winners::import_winners(pool, round_id, request).await
}
