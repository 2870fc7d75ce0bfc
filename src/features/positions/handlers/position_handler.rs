use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::elections::{ElectionContext, ElectionService};
use crate::features::positions::dtos::{CreatePositionDto, PositionResponseDto, UpdatePositionDto};
use crate::features::positions::services::PositionService;
use crate::shared::types::{ApiResponse, Meta};

/// State for position handlers
#[derive(Clone, FromRef)]
pub struct PositionState {
    pub elections: Arc<ElectionService>,
    pub positions: Arc<PositionService>,
}

#[derive(Debug, Deserialize)]
pub struct PositionPath {
    #[allow(dead_code)]
    pub election_slug: String,
    pub position_id: Uuid,
}

/// List positions in ballot order
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}/positions",
    params(("election_slug" = String, Path, description = "Election slug")),
    responses(
        (status = 200, description = "Positions retrieved", body = ApiResponse<Vec<PositionResponseDto>>),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "positions"
)]
pub async fn list_positions(
    ctx: ElectionContext,
    State(service): State<Arc<PositionService>>,
) -> Result<Json<ApiResponse<Vec<PositionResponseDto>>>> {
    let positions: Vec<PositionResponseDto> = service
        .list(ctx.election.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = positions.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(positions),
        None,
        Some(Meta { total }),
    )))
}

/// Add a position after the current last one
#[utoipa::path(
    post,
    path = "/api/elections/{election_slug}/positions",
    params(("election_slug" = String, Path, description = "Election slug")),
    request_body = CreatePositionDto,
    responses(
        (status = 201, description = "Position created", body = ApiResponse<PositionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "positions"
)]
pub async fn create_position(
    ctx: ElectionContext,
    State(service): State<Arc<PositionService>>,
    AppJson(dto): AppJson<CreatePositionDto>,
) -> Result<(StatusCode, Json<ApiResponse<PositionResponseDto>>)> {
    let position = service.create(ctx.election.id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(position.into()),
            Some("Position created".to_string()),
            None,
        )),
    ))
}

/// Rename or reorder a position
#[utoipa::path(
    patch,
    path = "/api/elections/{election_slug}/positions/{position_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("position_id" = Uuid, Path, description = "Position ID")
    ),
    request_body = UpdatePositionDto,
    responses(
        (status = 200, description = "Position updated", body = ApiResponse<PositionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or position not found")
    ),
    security(("bearer_auth" = [])),
    tag = "positions"
)]
pub async fn update_position(
    ctx: ElectionContext,
    State(service): State<Arc<PositionService>>,
    Path(path): Path<PositionPath>,
    AppJson(dto): AppJson<UpdatePositionDto>,
) -> Result<Json<ApiResponse<PositionResponseDto>>> {
    let position = service
        .update(ctx.election.id, path.position_id, dto)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(position.into()),
        Some("Position updated".to_string()),
        None,
    )))
}

/// Delete a position without candidates
#[utoipa::path(
    delete,
    path = "/api/elections/{election_slug}/positions/{position_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("position_id" = Uuid, Path, description = "Position ID")
    ),
    responses(
        (status = 204, description = "Position deleted"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or position not found"),
        (status = 409, description = "Candidates still run for this position")
    ),
    security(("bearer_auth" = [])),
    tag = "positions"
)]
pub async fn delete_position(
    ctx: ElectionContext,
    State(service): State<Arc<PositionService>>,
    Path(path): Path<PositionPath>,
) -> Result<StatusCode> {
    service.delete(ctx.election.id, path.position_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
