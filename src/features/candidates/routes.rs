use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::candidates::dtos::MAX_PHOTO_SIZE;
use crate::features::candidates::handlers::{self, CandidateState};
use crate::features::candidates::services::CandidateService;
use crate::features::elections::ElectionService;

/// Body limit for editor submissions (photo plus multipart overhead and the draft)
const CANDIDATE_BODY_LIMIT: usize = MAX_PHOTO_SIZE + 1024 * 1024;

/// Create routes for the candidates feature
pub fn routes(elections: Arc<ElectionService>, candidates: Arc<CandidateService>) -> Router {
    let state = CandidateState {
        elections,
        candidates,
    };

    Router::new()
        .route(
            "/api/elections/{election_slug}/candidates",
            get(handlers::list_candidates).post(handlers::create_candidate),
        )
        .route(
            "/api/elections/{election_slug}/candidates/{candidate_id}",
            get(handlers::get_candidate)
                .put(handlers::update_candidate)
                .layer(DefaultBodyLimit::max(CANDIDATE_BODY_LIMIT))
                .delete(handlers::delete_candidate),
        )
        .with_state(state)
}
