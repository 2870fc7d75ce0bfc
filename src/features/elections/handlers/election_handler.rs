use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::elections::context::ElectionContext;
use crate::features::elections::dtos::{
    CreateElectionDto, ElectionResponseDto, LandingResponseDto, UpdateElectionDto,
};
use crate::features::elections::events::ElectionEvents;
use crate::features::elections::services::ElectionService;
use crate::shared::types::{ApiResponse, Meta};

/// State for election handlers
#[derive(Clone, FromRef)]
pub struct ElectionState {
    pub elections: Arc<ElectionService>,
    pub events: Arc<ElectionEvents>,
}

/// Resolve the dashboard entry redirect for the signed-in account
#[utoipa::path(
    get,
    path = "/api/me/landing",
    responses(
        (status = 200, description = "Redirect target resolved", body = ApiResponse<LandingResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn get_landing(
    user: AuthenticatedUser,
    State(service): State<Arc<ElectionService>>,
) -> Result<Json<ApiResponse<LandingResponseDto>>> {
    let redirect_to = service.landing(&user).await?;
    Ok(Json(ApiResponse::success(
        Some(LandingResponseDto { redirect_to }),
        None,
        None,
    )))
}

/// List elections the admin is a commissioner of
#[utoipa::path(
    get,
    path = "/api/elections",
    responses(
        (status = 200, description = "Elections retrieved", body = ApiResponse<Vec<ElectionResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn list_elections(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ElectionService>>,
) -> Result<Json<ApiResponse<Vec<ElectionResponseDto>>>> {
    let elections: Vec<ElectionResponseDto> = service
        .list_for_account(&user.account_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = elections.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(elections),
        None,
        Some(Meta { total }),
    )))
}

/// Create an election owned by the signed-in admin
#[utoipa::path(
    post,
    path = "/api/elections",
    request_body = CreateElectionDto,
    responses(
        (status = 201, description = "Election created", body = ApiResponse<ElectionResponseDto>),
        (status = 400, description = "Validation error or slug already taken"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn create_election(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ElectionService>>,
    AppJson(dto): AppJson<CreateElectionDto>,
) -> Result<(StatusCode, Json<ApiResponse<ElectionResponseDto>>)> {
    let election = service.create(&user.account_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(election.into()),
            Some("Election created".to_string()),
            None,
        )),
    ))
}

/// Get an election by slug
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}",
    params(("election_slug" = String, Path, description = "Election slug")),
    responses(
        (status = 200, description = "Election retrieved", body = ApiResponse<ElectionResponseDto>),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn get_election(ctx: ElectionContext) -> Result<Json<ApiResponse<ElectionResponseDto>>> {
    Ok(Json(ApiResponse::success(
        Some(ctx.election.into()),
        None,
        None,
    )))
}

/// Update election settings
#[utoipa::path(
    patch,
    path = "/api/elections/{election_slug}",
    params(("election_slug" = String, Path, description = "Election slug")),
    request_body = UpdateElectionDto,
    responses(
        (status = 200, description = "Election updated", body = ApiResponse<ElectionResponseDto>),
        (status = 400, description = "Validation error or slug already taken"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn update_election(
    ctx: ElectionContext,
    State(service): State<Arc<ElectionService>>,
    AppJson(dto): AppJson<UpdateElectionDto>,
) -> Result<Json<ApiResponse<ElectionResponseDto>>> {
    let election = service.update(&ctx.election, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(election.into()),
        Some("Election updated".to_string()),
        None,
    )))
}

/// Delete an election with all of its candidates, partylists, positions and voters
#[utoipa::path(
    delete,
    path = "/api/elections/{election_slug}",
    params(("election_slug" = String, Path, description = "Election slug")),
    responses(
        (status = 204, description = "Election deleted"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn delete_election(
    ctx: ElectionContext,
    State(service): State<Arc<ElectionService>>,
) -> Result<StatusCode> {
    service.delete(&ctx.election).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    use crate::features::elections::events::ElectionEvents;
    use crate::features::elections::routes::routes;
    use crate::features::elections::services::ElectionService;
    use crate::modules::storage::InMemoryStorage;
    use crate::shared::test_helpers::{with_admin_auth, with_voter_auth};

    fn app() -> axum::Router {
        // Every request below is rejected before a query runs
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let events = Arc::new(ElectionEvents::new(4));
        let service = Arc::new(ElectionService::new(
            pool,
            Arc::new(InMemoryStorage::new()),
            Arc::clone(&events),
        ));
        routes(service, events)
    }

    #[tokio::test]
    async fn test_voter_cannot_list_elections() {
        let server = TestServer::new(with_voter_auth(app())).unwrap();
        let response = server.get("/api/elections").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_election_rejects_empty_name() {
        let server = TestServer::new(with_admin_auth(app())).unwrap();
        let response = server
            .post("/api/elections")
            .json(&json!({
                "name": "",
                "slug": "ssc-2024",
                "startDate": "2024-01-01T00:00:00Z",
                "endDate": "2024-01-02T00:00:00Z"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_election_reports_bad_slug_inline() {
        let server = TestServer::new(with_admin_auth(app())).unwrap();
        let response = server
            .post("/api/elections")
            .json(&json!({
                "name": "Student Council",
                "slug": "ssc_2024!",
                "startDate": "2024-01-01T00:00:00Z",
                "endDate": "2024-01-02T00:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let first_error = body["errors"][0].as_str().unwrap();
        assert!(first_error.starts_with("slug: "));
    }
}
