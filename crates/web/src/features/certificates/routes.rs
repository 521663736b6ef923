use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use storage::Database;

use super::handlers::{
    delete_certificate, generate_for_competition, generate_for_round, generate_for_winners,
    preview, release_one, release_scope, revoke_one, revoke_scope, summary,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/generate/competition", post(generate_for_competition))
        .route("/generate/round", post(generate_for_round))
        .route("/generate/winners", post(generate_for_winners))
        .route("/release", post(release_scope))
        .route("/revoke", post(revoke_scope))
        .route("/:id/release", post(release_one))
        .route("/:id/revoke", post(revoke_one))
        .route("/:id", delete(delete_certificate))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/preview", get(preview))
        .route("/summary", get(summary))
        .merge(protected)
}
