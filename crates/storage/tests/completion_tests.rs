//! City completion: winner selection on finales, result materialization,
//! finish/reopen transitions and cross-city winner import.

mod common;

use common::*;
use storage::dto::winners::{
    CityWinnerPick, ImportWinnersRequest, SelectWinnersRequest, WinnerSelection,
};
use storage::error::StorageError;
use storage::models::{competition_status, result_status};
use storage::repository::competition::CompetitionRepository;
use storage::services::{city_completion, promotion, winners};

async fn result_rows(db: &storage::Database, competition_id: i64) -> Vec<(i64, String, Option<i64>)> {
    sqlx::query_as(
        r#"
        SELECT r.participation_id, r.result_status, r.position
        FROM results r
        INNER JOIN participations p ON p.participation_id = r.participation_id
        WHERE p.competition_id = ?
        ORDER BY r.participation_id
        "#,
    )
    .bind(competition_id)
    .fetch_all(db.pool())
    .await
    .unwrap()
}

#[tokio::test]
async fn winners_can_only_be_selected_on_a_finale_round() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let participants = register_participants(&db, &track, 2).await;
    let round = create_round(&db, &track, false).await;
    add_all_to_round(&db, round.round_id, &participants).await;
    score_round(&db, round.round_id, &[(participants[0], 1.0), (participants[1], 2.0)]).await;

    let rp = round_participation_id(&db, round.round_id, participants[0]).await;
    let err = winners::select_winners(
        db.pool(),
        round.round_id,
        &SelectWinnersRequest {
            winners: vec![WinnerSelection {
                round_participation_id: rp,
                position: 1,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StorageError::StateConflict(_)));
}

#[tokio::test]
async fn winner_selection_requires_a_scored_round_member() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let participants = register_participants(&db, &track, 2).await;
    let finale = create_round(&db, &track, true).await;
    add_all_to_round(&db, finale.round_id, &participants).await;
    score_round(&db, finale.round_id, &[(participants[0], 5.0)]).await;

    // unscored member
    let unscored = round_participation_id(&db, finale.round_id, participants[1]).await;
    let err = winners::select_winners(
        db.pool(),
        finale.round_id,
        &SelectWinnersRequest {
            winners: vec![WinnerSelection {
                round_participation_id: unscored,
                position: 1,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    // not a member at all
    let err = winners::select_winners(
        db.pool(),
        finale.round_id,
        &SelectWinnersRequest {
            winners: vec![WinnerSelection {
                round_participation_id: 999_999,
                position: 1,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn selecting_winners_twice_replaces_the_previous_set() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let participants = register_participants(&db, &track, 3).await;
    let finale = create_round(&db, &track, true).await;
    add_all_to_round(&db, finale.round_id, &participants).await;
    score_round(
        &db,
        finale.round_id,
        &[
            (participants[0], 3.0),
            (participants[1], 2.0),
            (participants[2], 1.0),
        ],
    )
    .await;

    pick_winners(&db, finale.round_id, &[participants[0], participants[1]]).await;
    pick_winners(&db, finale.round_id, &[participants[2]]).await;

    let flagged: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT rp.participation_id, rs.winner_position
        FROM round_scores rs
        INNER JOIN round_participations rp
            ON rp.round_participation_id = rs.round_participation_id
        WHERE rs.round_id = ? AND rs.is_winner = 1
        "#,
    )
    .bind(finale.round_id)
    .fetch_all(db.pool())
    .await
    .unwrap();

    assert_eq!(flagged, vec![(participants[2], 1)]);
}

#[tokio::test]
async fn finishing_requires_a_finale_with_winners() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let participants = register_participants(&db, &track, 2).await;

    // no finale round at all
    let err = city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::StateConflict(_)));

    let finale = create_round(&db, &track, true).await;
    add_all_to_round(&db, finale.round_id, &participants).await;
    score_round(&db, finale.round_id, &[(participants[0], 1.0)]).await;

    // finale exists but no winners selected
    let err = city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::StateConflict(_)));

    let status = city_completion::city_status(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();
    assert!(status.has_finale);
    assert!(!status.finale_completed);
    assert!(!status.can_mark_finished);
}

#[tokio::test]
async fn finishing_materializes_winner_finalist_and_participant_results() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let participants = register_participants(&db, &track, 4).await;

    let round1 = create_round(&db, &track, false).await;
    let finale = create_round(&db, &track, true).await;
    add_all_to_round(&db, round1.round_id, &participants).await;
    score_round(
        &db,
        round1.round_id,
        &[
            (participants[0], 40.0),
            (participants[1], 30.0),
            (participants[2], 20.0),
            (participants[3], 10.0),
        ],
    )
    .await;

    promotion::promote_top(db.pool(), round1.round_id, 2)
        .await
        .unwrap();
    score_round(
        &db,
        finale.round_id,
        &[(participants[0], 9.0), (participants[1], 8.0)],
    )
    .await;
    pick_winners(&db, finale.round_id, &[participants[0]]).await;

    let status = city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();
    assert!(status.is_finished);

    let results = result_rows(&db, track.competition_id).await;
    assert_eq!(
        results,
        vec![
            (participants[0], result_status::WINNER.to_string(), Some(1)),
            (participants[1], result_status::FINALIST.to_string(), None),
            (participants[2], result_status::PARTICIPATED.to_string(), None),
            (participants[3], result_status::PARTICIPATED.to_string(), None),
        ]
    );

    // finishing again is a no-op, not an error
    let again = city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();
    assert!(again.is_finished);
    assert_eq!(result_rows(&db, track.competition_id).await.len(), 4);
}

#[tokio::test]
async fn finishing_the_last_city_completes_the_competition_and_reopen_reverts() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let participants = register_participants(&db, &track, 2).await;
    let finale = create_round(&db, &track, true).await;
    add_all_to_round(&db, finale.round_id, &participants).await;
    score_round(&db, finale.round_id, &[(participants[0], 2.0), (participants[1], 1.0)]).await;
    pick_winners(&db, finale.round_id, &[participants[0]]).await;

    city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();

    let competition = CompetitionRepository::new(db.pool())
        .find_by_id(track.competition_id)
        .await
        .unwrap();
    assert_eq!(competition.status, competition_status::COMPLETED);

    let status = city_completion::reopen_city(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();
    assert!(!status.is_finished);
    assert!(status.can_mark_finished);

    let competition = CompetitionRepository::new(db.pool())
        .find_by_id(track.competition_id)
        .await
        .unwrap();
    assert_eq!(competition.status, competition_status::ACTIVE);
    assert!(result_rows(&db, track.competition_id).await.is_empty());

    // reopening an open city is a no-op
    city_completion::reopen_city(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn an_open_city_holds_the_competition_active() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let other_city = attach_city(&db, track.competition_id, "Brest").await;
    let participants = register_participants(&db, &track, 2).await;

    let finale = create_round(&db, &track, true).await;
    add_all_to_round(&db, finale.round_id, &participants).await;
    score_round(&db, finale.round_id, &[(participants[0], 2.0), (participants[1], 1.0)]).await;
    pick_winners(&db, finale.round_id, &[participants[0]]).await;

    city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
        .await
        .unwrap();

    // the other city is still open
    let competition = CompetitionRepository::new(db.pool())
        .find_by_id(track.competition_id)
        .await
        .unwrap();
    assert_eq!(competition.status, competition_status::ACTIVE);

    let other_status = city_completion::city_status(db.pool(), track.competition_id, other_city)
        .await
        .unwrap();
    assert!(!other_status.is_finished);
    assert!(!other_status.has_finale);
}

#[tokio::test]
async fn reopening_one_city_leaves_other_cities_results_intact() {
    let db = test_db().await;
    let track_a = seed_track(&db, "Autumn Cup", "Lille").await;
    let city_b = attach_city(&db, track_a.competition_id, "Brest").await;
    let track_b = Track {
        competition_id: track_a.competition_id,
        city_id: city_b,
    };

    for track in [&track_a, &track_b] {
        let participants = register_participants(&db, track, 2).await;
        let finale = create_round(&db, track, true).await;
        add_all_to_round(&db, finale.round_id, &participants).await;
        score_round(&db, finale.round_id, &[(participants[0], 2.0), (participants[1], 1.0)]).await;
        pick_winners(&db, finale.round_id, &[participants[0]]).await;
        city_completion::mark_city_finished(db.pool(), track.competition_id, track.city_id)
            .await
            .unwrap();
    }

    assert_eq!(result_rows(&db, track_a.competition_id).await.len(), 4);

    city_completion::reopen_city(db.pool(), track_a.competition_id, track_a.city_id)
        .await
        .unwrap();

    let remaining = result_rows(&db, track_a.competition_id).await;
    assert_eq!(remaining.len(), 2);

    let city_b_participations: Vec<i64> = sqlx::query_scalar(
        "SELECT participation_id FROM participations WHERE competition_id = ? AND city_id = ?",
    )
    .bind(track_a.competition_id)
    .bind(city_b)
    .fetch_all(db.pool())
    .await
    .unwrap();
    assert!(remaining.iter().all(|(id, _, _)| city_b_participations.contains(id)));
}

#[tokio::test]
async fn available_winners_lists_other_cities_and_flags_imports() {
    let db = test_db().await;
    let track_a = seed_track(&db, "Autumn Cup", "Lille").await;
    let city_b = attach_city(&db, track_a.competition_id, "Brest").await;
    let track_b = Track {
        competition_id: track_a.competition_id,
        city_id: city_b,
    };

    // city A finale with two winners
    let a_participants = register_participants(&db, &track_a, 3).await;
    let a_finale = create_round(&db, &track_a, true).await;
    add_all_to_round(&db, a_finale.round_id, &a_participants).await;
    score_round(
        &db,
        a_finale.round_id,
        &[
            (a_participants[0], 30.0),
            (a_participants[1], 20.0),
            (a_participants[2], 10.0),
        ],
    )
    .await;
    pick_winners(&db, a_finale.round_id, &[a_participants[0], a_participants[1]]).await;

    // city B hosts the grand finale
    let b_finale = create_round(&db, &track_b, true).await;

    let available = winners::available_winners(db.pool(), b_finale.round_id)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].city_name, "Lille");
    let listed: Vec<i64> = available[0]
        .winners
        .iter()
        .map(|w| w.participation_id)
        .collect();
    assert_eq!(listed, vec![a_participants[0], a_participants[1]]);
    assert!(available[0].winners.iter().all(|w| !w.already_imported));

    // import the top winner only
    let outcome = winners::import_winners(
        db.pool(),
        b_finale.round_id,
        &ImportWinnersRequest {
            picks: vec![CityWinnerPick {
                city_id: track_a.city_id,
                count: 1,
            }],
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.imported, 1);

    let available = winners::available_winners(db.pool(), b_finale.round_id)
        .await
        .unwrap();
    assert!(available[0].winners[0].already_imported);
    assert!(!available[0].winners[1].already_imported);

    // importing again inserts nothing new
    let outcome = winners::import_winners(
        db.pool(),
        b_finale.round_id,
        &ImportWinnersRequest {
            picks: vec![CityWinnerPick {
                city_id: track_a.city_id,
                count: 2,
            }],
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.imported, 1);
}

#[tokio::test]
async fn importing_from_a_city_without_a_finale_fails() {
    let db = test_db().await;
    let track = seed_track(&db, "Autumn Cup", "Lille").await;
    let city_b = attach_city(&db, track.competition_id, "Brest").await;
    let finale = create_round(&db, &track, true).await;

    let err = winners::import_winners(
        db.pool(),
        finale.round_id,
        &ImportWinnersRequest {
            picks: vec![CityWinnerPick {
                city_id: city_b,
                count: 1,
            }],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}
