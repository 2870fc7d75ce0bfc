use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::elections::ElectionService;
use crate::features::positions::handlers::{self, PositionState};
use crate::features::positions::services::PositionService;

/// Create routes for the positions feature
pub fn routes(elections: Arc<ElectionService>, positions: Arc<PositionService>) -> Router {
    let state = PositionState {
        elections,
        positions,
    };

    Router::new()
        .route(
            "/api/elections/{election_slug}/positions",
            get(handlers::list_positions).post(handlers::create_position),
        )
        .route(
            "/api/elections/{election_slug}/positions/{position_id}",
            patch(handlers::update_position).delete(handlers::delete_position),
        )
        .with_state(state)
}
