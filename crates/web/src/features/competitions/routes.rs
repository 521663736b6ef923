use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use storage::Database;

use super::handlers::{
    attach_city, city_status, create_competition, create_round, delete_competition, finish_city,
    get_competition, list_competition_cities, list_competitions, list_participations,
    register_participation, reopen_city, update_competition,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(create_competition))
        .route("/:id", put(update_competition))
        .route("/:id", delete(delete_competition))
        .route("/:id/cities", post(attach_city))
        .route("/:id/cities/:city_id/rounds", post(create_round))
        .route("/:id/cities/:city_id/finish", post(finish_city))
        .route("/:id/cities/:city_id/reopen", post(reopen_city))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_competitions))
        .route("/:id", get(get_competition))
        .route("/:id/cities", get(list_competition_cities))
        .route("/:id/cities/:city_id/status", get(city_status))
        .route("/:id/participations", post(register_participation))
        .route("/:id/participations", get(list_participations))
        .merge(protected)
}

pub fn city_routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(super::handlers::create_city))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(super::handlers::list_cities))
        .merge(protected)
}
