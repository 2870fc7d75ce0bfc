use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request DTO for adding a voter
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoterDto {
    #[validate(email(message = "Email must be a valid address"))]
    #[validate(length(max = 255, message = "Email must not exceed 255 characters"))]
    pub email: String,
}

/// Response DTO for a voter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoterResponseDto {
    pub id: Uuid,
    pub email: String,
    pub has_voted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_create_voter_accepts_email() {
        let dto = CreateVoterDto {
            email: SafeEmail().fake(),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_voter_rejects_garbage() {
        let dto = CreateVoterDto {
            email: "not-an-email".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
