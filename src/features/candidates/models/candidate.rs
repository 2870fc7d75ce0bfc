use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::candidates::credentials::Credentials;
use crate::features::candidates::dtos::CandidateResponseDto;

/// Database model for a candidate
#[derive(Debug, Clone, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub election_id: Uuid,
    pub position_id: Uuid,
    pub partylist_id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub slug: String,
    pub photo_url: Option<String>,
    pub credentials: Json<Credentials>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref() {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl From<Candidate> for CandidateResponseDto {
    fn from(c: Candidate) -> Self {
        let full_name = c.full_name();
        Self {
            id: c.id,
            election_id: c.election_id,
            position_id: c.position_id,
            partylist_id: c.partylist_id,
            first_name: c.first_name,
            middle_name: c.middle_name,
            last_name: c.last_name,
            full_name,
            slug: c.slug,
            photo_url: c.photo_url,
            credentials: c.credentials.0,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
