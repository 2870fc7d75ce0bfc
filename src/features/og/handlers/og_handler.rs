use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::core::error::{AppError, Result};
use crate::features::og::dtos::PreviewQuery;
use crate::features::og::services::{PreviewCard, PreviewService};

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Render a social preview card
///
/// Missing or unknown `type`, or a missing required parameter, renders the
/// 404 card with status 404.
#[utoipa::path(
    get,
    path = "/api/og",
    params(PreviewQuery),
    responses(
        (status = 200, description = "Preview card", content_type = "image/svg+xml", body = String),
        (status = 404, description = "Not found card", content_type = "image/svg+xml", body = String)
    ),
    tag = "og"
)]
pub async fn get_preview(
    State(service): State<Arc<PreviewService>>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response> {
    let card = PreviewCard::from_query(&query);
    let status = if card.is_found() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    let svg = service.render(&card).map_err(|e| {
        tracing::error!("Failed to render preview card: {}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok((
        status,
        [
            (header::CONTENT_TYPE, SVG_CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        svg,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::features::og::routes::routes;
    use crate::features::og::services::{test_config, PreviewService};

    fn server() -> TestServer {
        let service = PreviewService::new(test_config()).unwrap();
        TestServer::new(routes(std::sync::Arc::new(service))).unwrap()
    }

    #[tokio::test]
    async fn test_candidate_preview_is_svg() {
        let response = server()
            .get("/api/og")
            .add_query_param("type", "candidate")
            .add_query_param("fullName", "Juan Dela Cruz")
            .add_query_param("position", "President")
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/svg+xml");
        assert!(response.text().contains("Juan Dela Cruz"));
    }

    #[tokio::test]
    async fn test_missing_parameter_returns_not_found_card() {
        let response = server()
            .get("/api/og")
            .add_query_param("type", "election")
            .add_query_param("electionName", "SSC")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains(">404<"));
    }

    #[tokio::test]
    async fn test_query_text_is_escaped() {
        let response = server()
            .get("/api/og")
            .add_query_param("type", "candidate")
            .add_query_param("fullName", "<b>Mallory</b>")
            .add_query_param("position", "Auditor")
            .await;

        response.assert_status_ok();
        let body = response.text();
        assert!(!body.contains("<b>"));
        assert!(body.contains("&lt;b&gt;Mallory"));
    }
}
