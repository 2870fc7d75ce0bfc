use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::elections::{ElectionContext, ElectionService};
use crate::features::voters::dtos::{CreateVoterDto, VoterResponseDto};
use crate::features::voters::services::VoterService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// State for voter handlers
#[derive(Clone, FromRef)]
pub struct VoterState {
    pub elections: Arc<ElectionService>,
    pub voters: Arc<VoterService>,
}

#[derive(Debug, Deserialize)]
pub struct VoterPath {
    #[allow(dead_code)]
    pub election_slug: String,
    pub voter_id: Uuid,
}

/// List voters (paginated)
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}/voters",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Voters retrieved", body = ApiResponse<Vec<VoterResponseDto>>),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "voters"
)]
pub async fn list_voters(
    ctx: ElectionContext,
    State(service): State<Arc<VoterService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<VoterResponseDto>>>> {
    let (voters, total) = service
        .list(ctx.election.id, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(voters.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

/// Add a voter by email
#[utoipa::path(
    post,
    path = "/api/elections/{election_slug}/voters",
    params(("election_slug" = String, Path, description = "Election slug")),
    request_body = CreateVoterDto,
    responses(
        (status = 201, description = "Voter added", body = ApiResponse<VoterResponseDto>),
        (status = 400, description = "Invalid email or voter already added"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "voters"
)]
pub async fn create_voter(
    ctx: ElectionContext,
    State(service): State<Arc<VoterService>>,
    AppJson(dto): AppJson<CreateVoterDto>,
) -> Result<(StatusCode, Json<ApiResponse<VoterResponseDto>>)> {
    let voter = service.add(ctx.election.id, &dto.email).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(voter.into()),
            Some("Voter added".to_string()),
            None,
        )),
    ))
}

/// Remove a voter
#[utoipa::path(
    delete,
    path = "/api/elections/{election_slug}/voters/{voter_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("voter_id" = Uuid, Path, description = "Voter ID")
    ),
    responses(
        (status = 204, description = "Voter deleted"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or voter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "voters"
)]
pub async fn delete_voter(
    ctx: ElectionContext,
    State(service): State<Arc<VoterService>>,
    Path(path): Path<VoterPath>,
) -> Result<StatusCode> {
    service.delete(ctx.election.id, path.voter_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
