use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request DTO for creating a partylist
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartylistDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Abbreviation must be 1-50 characters"))]
    pub abbreviation: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Logo must be a valid URL"))]
    pub logo_url: Option<String>,
}

/// Request DTO for the partylist edit form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartylistDto {
    #[validate(length(max = 255, message = "Name must not exceed 255 characters"))]
    pub name: String,

    #[validate(length(max = 50, message = "Abbreviation must not exceed 50 characters"))]
    pub abbreviation: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Response DTO for a partylist
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartylistResponseDto {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// The default partylist; cannot be edited or deleted
    pub is_independent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
