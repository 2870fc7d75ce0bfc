use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::og::handlers;
use crate::features::og::services::PreviewService;

/// Public routes for social preview cards
pub fn routes(previews: Arc<PreviewService>) -> Router {
    Router::new()
        .route("/api/og", get(handlers::get_preview))
        .with_state(previews)
}
