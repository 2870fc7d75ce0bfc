use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::elections::dtos::ElectionResponseDto;

/// Database model for an election
#[derive(Debug, Clone, FromRow)]
pub struct Election {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Election> for ElectionResponseDto {
    fn from(e: Election) -> Self {
        Self {
            id: e.id,
            name: e.name,
            slug: e.slug,
            start_date: e.start_date,
            end_date: e.end_date,
            logo_url: e.logo_url,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
