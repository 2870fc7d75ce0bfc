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
use crate::features::partylists::dtos::{
    CreatePartylistDto, PartylistResponseDto, UpdatePartylistDto,
};
use crate::features::partylists::services::PartylistService;
use crate::shared::types::{ApiResponse, Meta};

/// State for partylist handlers
#[derive(Clone, FromRef)]
pub struct PartylistState {
    pub elections: Arc<ElectionService>,
    pub partylists: Arc<PartylistService>,
}

#[derive(Debug, Deserialize)]
pub struct PartylistPath {
    #[allow(dead_code)]
    pub election_slug: String,
    pub partylist_id: Uuid,
}

/// List partylists of an election
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}/partylists",
    params(("election_slug" = String, Path, description = "Election slug")),
    responses(
        (status = 200, description = "Partylists retrieved", body = ApiResponse<Vec<PartylistResponseDto>>),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "partylists"
)]
pub async fn list_partylists(
    ctx: ElectionContext,
    State(service): State<Arc<PartylistService>>,
) -> Result<Json<ApiResponse<Vec<PartylistResponseDto>>>> {
    let partylists: Vec<PartylistResponseDto> = service
        .list(ctx.election.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = partylists.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(partylists),
        None,
        Some(Meta { total }),
    )))
}

/// Add a partylist
#[utoipa::path(
    post,
    path = "/api/elections/{election_slug}/partylists",
    params(("election_slug" = String, Path, description = "Election slug")),
    request_body = CreatePartylistDto,
    responses(
        (status = 201, description = "Partylist created", body = ApiResponse<PartylistResponseDto>),
        (status = 400, description = "Validation error, reserved or taken abbreviation"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "partylists"
)]
pub async fn create_partylist(
    ctx: ElectionContext,
    State(service): State<Arc<PartylistService>>,
    AppJson(dto): AppJson<CreatePartylistDto>,
) -> Result<(StatusCode, Json<ApiResponse<PartylistResponseDto>>)> {
    let partylist = service.create(ctx.election.id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(partylist.into()),
            Some("Partylist created".to_string()),
            None,
        )),
    ))
}

/// Edit a partylist
///
/// Submitting the current values (after trimming) writes nothing.
#[utoipa::path(
    patch,
    path = "/api/elections/{election_slug}/partylists/{partylist_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("partylist_id" = Uuid, Path, description = "Partylist ID")
    ),
    request_body = UpdatePartylistDto,
    responses(
        (status = 200, description = "Partylist updated or unchanged", body = ApiResponse<PartylistResponseDto>),
        (status = 400, description = "Validation error, reserved or taken abbreviation"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or partylist not found"),
        (status = 409, description = "The independent partylist cannot be edited")
    ),
    security(("bearer_auth" = [])),
    tag = "partylists"
)]
pub async fn update_partylist(
    ctx: ElectionContext,
    State(service): State<Arc<PartylistService>>,
    Path(path): Path<PartylistPath>,
    AppJson(dto): AppJson<UpdatePartylistDto>,
) -> Result<Json<ApiResponse<PartylistResponseDto>>> {
    let outcome = service
        .update(ctx.election.id, path.partylist_id, dto)
        .await?;
    let message = if outcome.changed {
        "Partylist updated"
    } else {
        "No changes to save"
    };
    Ok(Json(ApiResponse::success(
        Some(outcome.partylist.into()),
        Some(message.to_string()),
        None,
    )))
}

/// Delete a partylist
///
/// Candidates of the deleted partylist are moved to the independent partylist.
#[utoipa::path(
    delete,
    path = "/api/elections/{election_slug}/partylists/{partylist_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("partylist_id" = Uuid, Path, description = "Partylist ID")
    ),
    responses(
        (status = 204, description = "Partylist deleted"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or partylist not found"),
        (status = 409, description = "The independent partylist cannot be deleted")
    ),
    security(("bearer_auth" = [])),
    tag = "partylists"
)]
pub async fn delete_partylist(
    ctx: ElectionContext,
    State(service): State<Arc<PartylistService>>,
    Path(path): Path<PartylistPath>,
) -> Result<StatusCode> {
    service.delete(ctx.election.id, path.partylist_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
