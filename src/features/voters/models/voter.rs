use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::voters::dtos::VoterResponseDto;

/// Database model for a voter
#[derive(Debug, Clone, FromRow)]
pub struct Voter {
    pub id: Uuid,
    pub election_id: Uuid,
    pub email: String,
    pub has_voted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Voter> for VoterResponseDto {
    fn from(v: Voter) -> Self {
        Self {
            id: v.id,
            email: v.email,
            has_voted: v.has_voted,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
