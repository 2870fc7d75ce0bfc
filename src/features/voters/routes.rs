use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::elections::ElectionService;
use crate::features::voters::handlers::{self, VoterState};
use crate::features::voters::services::VoterService;

/// Create routes for the voters feature
pub fn routes(elections: Arc<ElectionService>, voters: Arc<VoterService>) -> Router {
    let state = VoterState { elections, voters };

    Router::new()
        .route(
            "/api/elections/{election_slug}/voters",
            get(handlers::list_voters).post(handlers::create_voter),
        )
        .route(
            "/api/elections/{election_slug}/voters/{voter_id}",
            delete(handlers::delete_voter),
        )
        .with_state(state)
}
