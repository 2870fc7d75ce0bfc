use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::partylists::dtos::PartylistResponseDto;
use crate::shared::constants::INDEPENDENT_ABBREVIATION;

/// Database model for a partylist
#[derive(Debug, Clone, FromRow)]
pub struct Partylist {
    pub id: Uuid,
    pub election_id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partylist {
    /// The default partylist every election is created with
    pub fn is_independent(&self) -> bool {
        is_independent_abbreviation(&self.abbreviation)
    }
}

pub fn is_independent_abbreviation(abbreviation: &str) -> bool {
    abbreviation.trim().eq_ignore_ascii_case(INDEPENDENT_ABBREVIATION)
}

impl From<Partylist> for PartylistResponseDto {
    fn from(p: Partylist) -> Self {
        let is_independent = p.is_independent();
        Self {
            id: p.id,
            name: p.name,
            abbreviation: p.abbreviation,
            description: p.description,
            logo_url: p.logo_url,
            is_independent,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
