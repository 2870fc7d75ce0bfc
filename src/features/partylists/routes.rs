use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::elections::ElectionService;
use crate::features::partylists::handlers::{self, PartylistState};
use crate::features::partylists::services::PartylistService;

/// Create routes for the partylists feature
pub fn routes(elections: Arc<ElectionService>, partylists: Arc<PartylistService>) -> Router {
    let state = PartylistState {
        elections,
        partylists,
    };

    Router::new()
        .route(
            "/api/elections/{election_slug}/partylists",
            get(handlers::list_partylists).post(handlers::create_partylist),
        )
        .route(
            "/api/elections/{election_slug}/partylists/{partylist_id}",
            patch(handlers::update_partylist).delete(handlers::delete_partylist),
        )
        .with_state(state)
}
