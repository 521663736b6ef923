#![allow(dead_code)]

use storage::Database;
use storage::dto::competition::CreateCompetitionRequest;
use storage::dto::participation::RegisterParticipationRequest;
use storage::dto::round::CreateRoundRequest;
use storage::dto::score::{ScoreBatchEntry, ScoreBatchRequest};
use storage::dto::winners::{SelectWinnersRequest, WinnerSelection};
use storage::models::{Round, competition_status, participation_source};
use storage::repository::city::CityRepository;
use storage::repository::competition::CompetitionRepository;
use storage::repository::participation::ParticipationRepository;
use storage::repository::round::RoundRepository;
use storage::services::{promotion, score_ingestion, winners};

pub async fn test_db() -> Database {
    let db = Database::in_memory().await.unwrap();
    db.run_migrations().await.unwrap();
    db
}

pub struct Track {
    pub competition_id: i64,
    pub city_id: i64,
}

/// An ACTIVE competition with one attached city.
pub async fn seed_track(db: &Database, competition_name: &str, city_name: &str) -> Track {
    let competition = CompetitionRepository::new(db.pool())
        .create(&CreateCompetitionRequest {
            name: competition_name.to_string(),
            status: competition_status::ACTIVE.to_string(),
            registration_open: true,
        })
        .await
        .unwrap();

    let city_id = attach_city(db, competition.competition_id, city_name).await;

    Track {
        competition_id: competition.competition_id,
        city_id,
    }
}

/// Create a city and attach it to an existing competition.
pub async fn attach_city(db: &Database, competition_id: i64, city_name: &str) -> i64 {
    let repo = CityRepository::new(db.pool());
    let city = repo.create(city_name).await.unwrap();
    repo.attach_to_competition(competition_id, city.city_id, None)
        .await
        .unwrap();
    city.city_id
}

/// Register `count` admin-added participants; returns their participation ids.
/// User ids are drawn from a process-wide counter so repeated calls on the
/// same track never collide with the UNIQUE(user_id, competition_id, city_id)
/// constraint.
pub async fn register_participants(db: &Database, track: &Track, count: i64) -> Vec<i64> {
    use std::sync::atomic::{AtomicI64, Ordering};
    static NEXT_USER_ID: AtomicI64 = AtomicI64::new(1001);

    let repo = ParticipationRepository::new(db.pool());
    let mut ids = Vec::new();

    for n in 1..=count {
        let participation = repo
            .register(
                track.competition_id,
                &RegisterParticipationRequest {
                    user_id: NEXT_USER_ID.fetch_add(1, Ordering::Relaxed),
                    full_name: format!("Participant {n}"),
                    city_id: track.city_id,
                    source: participation_source::ADMIN_ADDED.to_string(),
                },
            )
            .await
            .unwrap();
        ids.push(participation.participation_id);
    }

    ids
}

pub async fn create_round(db: &Database, track: &Track, is_finale: bool) -> Round {
    RoundRepository::new(db.pool())
        .create(
            track.competition_id,
            track.city_id,
            &CreateRoundRequest {
                name: None,
                is_finale,
            },
        )
        .await
        .unwrap()
}

pub async fn add_all_to_round(db: &Database, round_id: i64, participation_ids: &[i64]) {
    for participation_id in participation_ids {
        promotion::add_participant(db.pool(), round_id, *participation_id)
            .await
            .unwrap();
    }
}

/// Upload one score per (participation, score) pair as a single batch.
pub async fn score_round(db: &Database, round_id: i64, scores: &[(i64, f64)]) {
    let entries = scores
        .iter()
        .map(|(participation_id, score)| ScoreBatchEntry {
            participation_id: *participation_id,
            score: score.to_string(),
            notes: None,
        })
        .collect();

    let outcome = score_ingestion::upload_score_batch(
        db.pool(),
        round_id,
        &ScoreBatchRequest { entries },
    )
    .await
    .unwrap();
    assert_eq!(outcome.failed, 0, "seed batch failed: {:?}", outcome.errors);
}

/// The round_participation_id of one participation within one round.
pub async fn round_participation_id(db: &Database, round_id: i64, participation_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT round_participation_id FROM round_participations WHERE round_id = ? AND participation_id = ?",
    )
    .bind(round_id)
    .bind(participation_id)
    .fetch_one(db.pool())
    .await
    .unwrap()
}

/// Mark the given participations as the round's winners at positions 1, 2, ...
pub async fn pick_winners(db: &Database, round_id: i64, participation_ids: &[i64]) {
    let mut selections = Vec::new();
    for (idx, participation_id) in participation_ids.iter().enumerate() {
        selections.push(WinnerSelection {
            round_participation_id: round_participation_id(db, round_id, *participation_id).await,
            position: idx as i64 + 1,
        });
    }

    winners::select_winners(
        db.pool(),
        round_id,
        &SelectWinnersRequest {
            winners: selections,
        },
    )
    .await
    .unwrap();
}
