use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::candidates::credentials::{CredentialEdit, Credentials};

/// Request DTO for adding a candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateDto {
    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: String,

    #[validate(length(max = 255, message = "Middle name must not exceed 255 characters"))]
    pub middle_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: String,

    /// Candidate page URL segment; normalized before saving
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: String,

    pub position_id: Uuid,
    pub partylist_id: Uuid,
}

/// Full candidate draft submitted from the editor
///
/// Sent as the `candidate` part of a multipart request; the optional
/// `photo` part carries a new photo.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidateDto {
    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: String,

    #[validate(length(max = 255, message = "Middle name must not exceed 255 characters"))]
    pub middle_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: String,

    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: String,

    pub position_id: Uuid,
    pub partylist_id: Uuid,

    /// Whole credentials document; the stored one is kept when absent
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Editor steps replayed on top of `credentials` (or the stored document), in order
    #[serde(default)]
    pub credential_edits: Vec<CredentialEdit>,

    /// Clear the current photo (ignored when a new photo is attached)
    #[serde(default)]
    pub remove_photo: bool,
}

/// Multipart form for candidate updates (Swagger UI documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UpdateCandidateForm {
    /// JSON-encoded `UpdateCandidateDto`
    pub candidate: UpdateCandidateDto,
    /// New candidate photo
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photo: Option<String>,
}

/// Query parameters for listing candidates
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQueryParams {
    /// Only candidates running for this position
    pub position_id: Option<Uuid>,
}

/// Response DTO for a candidate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponseDto {
    pub id: Uuid,
    pub election_id: Uuid,
    pub position_id: Uuid,
    pub partylist_id: Uuid,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub credentials: Credentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allowed MIME types for candidate photos
pub const ALLOWED_PHOTO_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum photo size in bytes (5MB)
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Get file extension from a photo content type
pub fn photo_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
