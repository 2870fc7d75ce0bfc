use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::elections::events::ElectionEvents;
use crate::features::elections::handlers::{self, ElectionState};
use crate::features::elections::services::ElectionService;

/// Create routes for the elections feature (all require authentication)
pub fn routes(elections: Arc<ElectionService>, events: Arc<ElectionEvents>) -> Router {
    let state = ElectionState { elections, events };

    Router::new()
        .route("/api/me/landing", get(handlers::get_landing))
        .route(
            "/api/elections",
            get(handlers::list_elections).post(handlers::create_election),
        )
        .route(
            "/api/elections/{election_slug}",
            get(handlers::get_election)
                .patch(handlers::update_election)
                .delete(handlers::delete_election),
        )
        .route(
            "/api/elections/{election_slug}/events",
            get(handlers::stream_events),
        )
        .with_state(state)
}
