use std::sync::Arc;

use axum::{
    extract::{FromRef, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::candidates::dtos::{
    CandidateQueryParams, CandidateResponseDto, CreateCandidateDto, UpdateCandidateDto,
    UpdateCandidateForm,
};
use crate::features::candidates::photo::PhotoUpload;
use crate::features::candidates::services::CandidateService;
use crate::features::elections::{ElectionContext, ElectionService};
use crate::shared::types::{ApiResponse, Meta};

/// State for candidate handlers
#[derive(Clone, FromRef)]
pub struct CandidateState {
    pub elections: Arc<ElectionService>,
    pub candidates: Arc<CandidateService>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePath {
    #[allow(dead_code)]
    pub election_slug: String,
    pub candidate_id: Uuid,
}

/// List candidates of an election
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}/candidates",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        CandidateQueryParams
    ),
    responses(
        (status = 200, description = "Candidates retrieved", body = ApiResponse<Vec<CandidateResponseDto>>),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "candidates"
)]
pub async fn list_candidates(
    ctx: ElectionContext,
    State(service): State<Arc<CandidateService>>,
    Query(params): Query<CandidateQueryParams>,
) -> Result<Json<ApiResponse<Vec<CandidateResponseDto>>>> {
    let candidates: Vec<CandidateResponseDto> = service
        .list(ctx.election.id, params.position_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = candidates.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(candidates),
        None,
        Some(Meta { total }),
    )))
}

/// Get a candidate
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}/candidates/{candidate_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate retrieved", body = ApiResponse<CandidateResponseDto>),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or candidate not found")
    ),
    security(("bearer_auth" = [])),
    tag = "candidates"
)]
pub async fn get_candidate(
    ctx: ElectionContext,
    State(service): State<Arc<CandidateService>>,
    Path(path): Path<CandidatePath>,
) -> Result<Json<ApiResponse<CandidateResponseDto>>> {
    let candidate = service.get(ctx.election.id, path.candidate_id).await?;
    Ok(Json(ApiResponse::success(
        Some(candidate.into()),
        None,
        None,
    )))
}

/// Add a candidate
#[utoipa::path(
    post,
    path = "/api/elections/{election_slug}/candidates",
    params(("election_slug" = String, Path, description = "Election slug")),
    request_body = CreateCandidateDto,
    responses(
        (status = 201, description = "Candidate created", body = ApiResponse<CandidateResponseDto>),
        (status = 400, description = "Validation error or slug already taken"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "candidates"
)]
pub async fn create_candidate(
    ctx: ElectionContext,
    State(service): State<Arc<CandidateService>>,
    AppJson(dto): AppJson<CreateCandidateDto>,
) -> Result<(StatusCode, Json<ApiResponse<CandidateResponseDto>>)> {
    let candidate = service.create(ctx.election.id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(candidate.into()),
            Some("Candidate created".to_string()),
            None,
        )),
    ))
}

/// Submit the candidate editor
///
/// Accepts multipart/form-data with:
/// - `candidate`: JSON-encoded candidate draft (required)
/// - `photo`: new candidate photo (optional)
///
/// A draft identical to the stored candidate without a new photo writes nothing.
#[utoipa::path(
    put,
    path = "/api/elections/{election_slug}/candidates/{candidate_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body(content = UpdateCandidateForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Candidate updated or unchanged", body = ApiResponse<CandidateResponseDto>),
        (status = 400, description = "Validation error or slug already taken"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or candidate not found"),
        (status = 502, description = "Photo storage failed")
    ),
    security(("bearer_auth" = [])),
    tag = "candidates"
)]
pub async fn update_candidate(
    ctx: ElectionContext,
    State(service): State<Arc<CandidateService>>,
    Path(path): Path<CandidatePath>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<CandidateResponseDto>>> {
    let mut draft: Option<UpdateCandidateDto> = None;
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "candidate" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read candidate field: {}", e))
                })?;
                let dto = serde_json::from_str::<UpdateCandidateDto>(&text)
                    .map_err(|e| AppError::BadRequest(format!("Invalid candidate JSON: {}", e)))?;
                draft = Some(dto);
            }
            "photo" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read photo bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read photo data: {}", e))
                })?;
                // Browsers send an empty part when no file was chosen
                if !data.is_empty() {
                    photo = Some(PhotoUpload {
                        data: data.to_vec(),
                        content_type,
                    });
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let draft =
        draft.ok_or_else(|| AppError::BadRequest("Candidate field is required".to_string()))?;
    draft
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = service
        .update(ctx.election.id, path.candidate_id, draft, photo)
        .await?;

    let message = if outcome.changed {
        "Candidate updated"
    } else {
        "No changes to save"
    };
    Ok(Json(ApiResponse::success(
        Some(outcome.candidate.into()),
        Some(message.to_string()),
        None,
    )))
}

/// Delete a candidate and its photo
#[utoipa::path(
    delete,
    path = "/api/elections/{election_slug}/candidates/{candidate_id}",
    params(
        ("election_slug" = String, Path, description = "Election slug"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 204, description = "Candidate deleted"),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election or candidate not found")
    ),
    security(("bearer_auth" = [])),
    tag = "candidates"
)]
pub async fn delete_candidate(
    ctx: ElectionContext,
    State(service): State<Arc<CandidateService>>,
    Path(path): Path<CandidatePath>,
) -> Result<StatusCode> {
    service.delete(ctx.election.id, path.candidate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
