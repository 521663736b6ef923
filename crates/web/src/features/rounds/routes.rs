use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use storage::Database;

use super::handlers::{
    add_participant, archive_round, available_winners, clear_scores, delete_round,
    eligible_participants, get_round, import_winners, leaderboard, promote_participant,
    promote_top, remove_participant, select_winners, unarchive_round, update_round, update_score,
    upload_score_batch,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:id", put(update_round))
        .route("/:id", delete(delete_round))
        .route("/:id/archive", post(archive_round))
        .route("/:id/unarchive", post(unarchive_round))
        .route("/:id/scores/batch", post(upload_score_batch))
        .route("/:id/scores/clear", post(clear_scores))
        .route("/:id/scores/:round_participation_id", put(update_score))
        .route("/:id/promote", post(promote_top))
        .route("/:id/promote-participant", post(promote_participant))
        .route("/:id/participants", post(add_participant))
        .route("/:id/participants/:participation_id", delete(remove_participant))
        .route("/:id/winners", post(select_winners))
        .route("/:id/import-winners", post(import_winners))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:id", get(get_round))
        .route("/:id/eligible-participants", get(eligible_participants))
        .route("/:id/leaderboard", get(leaderboard))
        .route("/:id/available-winners", get(available_winners))
        .merge(protected)
}
