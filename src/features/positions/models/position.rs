use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::positions::dtos::PositionResponseDto;

/// Database model for a position on the ballot
#[derive(Debug, Clone, FromRow)]
pub struct Position {
    pub id: Uuid,
    pub election_id: Uuid,
    pub title: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Position> for PositionResponseDto {
    fn from(p: Position) -> Self {
        Self {
            id: p.id,
            title: p.title,
            display_order: p.display_order,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
