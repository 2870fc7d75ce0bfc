use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database;
use crate::core::error::{AppError, Result};
use crate::features::elections::{
    touch_election, ChangeAction, ChangeTarget, ElectionEvent, ElectionEvents,
};
use crate::features::partylists::dtos::{CreatePartylistDto, UpdatePartylistDto};
use crate::features::partylists::models::{is_independent_abbreviation, Partylist};
use crate::shared::constants::INDEPENDENT_ABBREVIATION;

const PARTYLIST_COLUMNS: &str =
    "id, election_id, name, abbreviation, description, logo_url, created_at, updated_at";

const ABBREVIATION_CONSTRAINT: &str = "uq_partylists_election_abbreviation";

/// Normalized fields written by a partylist edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartylistPatch {
    pub name: String,
    pub abbreviation: String,
    pub description: Option<String>,
}

fn trimmed_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn abbreviation_taken_error() -> AppError {
    AppError::field("abbreviation", "Abbreviation is already taken")
}

/// Map a unique violation on the abbreviation index to the inline field error
fn map_write_error(e: sqlx::Error) -> AppError {
    let is_abbreviation_conflict = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|constraint| constraint == ABBREVIATION_CONSTRAINT);
    if is_abbreviation_conflict {
        return abbreviation_taken_error();
    }
    tracing::error!("Failed to write partylist: {:?}", e);
    AppError::Database(e)
}

fn reserved_abbreviation_error() -> AppError {
    AppError::field(
        "abbreviation",
        &format!("{} is reserved for independent candidates", INDEPENDENT_ABBREVIATION),
    )
}

/// Decide what an edit form submission writes; `None` means nothing changed.
pub fn plan_partylist_update(
    current: &Partylist,
    dto: &UpdatePartylistDto,
) -> Result<Option<PartylistPatch>> {
    if current.is_independent() {
        return Err(AppError::Conflict(
            "The independent partylist cannot be edited".to_string(),
        ));
    }

    let patch = PartylistPatch {
        name: dto.name.trim().to_string(),
        abbreviation: dto.abbreviation.trim().to_string(),
        description: trimmed_description(dto.description.as_deref()),
    };

    if patch.name.is_empty() {
        return Err(AppError::field("name", "Name is required"));
    }
    if patch.abbreviation.is_empty() {
        return Err(AppError::field("abbreviation", "Abbreviation is required"));
    }

    let unchanged = patch.name == current.name.trim()
        && patch.abbreviation == current.abbreviation.trim()
        && patch.description == trimmed_description(current.description.as_deref());
    if unchanged {
        return Ok(None);
    }

    if is_independent_abbreviation(&patch.abbreviation) {
        return Err(reserved_abbreviation_error());
    }

    Ok(Some(patch))
}

/// Outcome of a partylist edit
#[derive(Debug)]
pub struct PartylistUpdate {
    pub partylist: Partylist,
    pub changed: bool,
}

/// Service for partylists
pub struct PartylistService {
    pool: PgPool,
    events: Arc<ElectionEvents>,
}

impl PartylistService {
    pub fn new(pool: PgPool, events: Arc<ElectionEvents>) -> Self {
        Self { pool, events }
    }

    pub async fn list(&self, election_id: Uuid) -> Result<Vec<Partylist>> {
        let query = format!(
            "SELECT {} FROM partylists WHERE election_id = $1 ORDER BY created_at ASC",
            PARTYLIST_COLUMNS
        );
        let partylists = sqlx::query_as::<_, Partylist>(&query)
            .bind(election_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(partylists)
    }

    pub async fn get(&self, election_id: Uuid, partylist_id: Uuid) -> Result<Partylist> {
        let query = format!(
            "SELECT {} FROM partylists WHERE id = $1 AND election_id = $2",
            PARTYLIST_COLUMNS
        );
        sqlx::query_as::<_, Partylist>(&query)
            .bind(partylist_id)
            .bind(election_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Partylist {} not found", partylist_id)))
    }

    async fn abbreviation_taken(
        &self,
        election_id: Uuid,
        abbreviation: &str,
        except: Option<Uuid>,
    ) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM partylists
                WHERE election_id = $1 AND UPPER(abbreviation) = UPPER($2)
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(election_id)
        .bind(abbreviation)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, election_id: Uuid, dto: CreatePartylistDto) -> Result<Partylist> {
        let name = dto.name.trim();
        let abbreviation = dto.abbreviation.trim();
        if name.is_empty() {
            return Err(AppError::field("name", "Name is required"));
        }
        if abbreviation.is_empty() {
            return Err(AppError::field("abbreviation", "Abbreviation is required"));
        }
        if is_independent_abbreviation(abbreviation) {
            return Err(reserved_abbreviation_error());
        }
        if self.abbreviation_taken(election_id, abbreviation, None).await? {
            return Err(abbreviation_taken_error());
        }

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            INSERT INTO partylists (election_id, name, abbreviation, description, logo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PARTYLIST_COLUMNS
        );
        let partylist = sqlx::query_as::<_, Partylist>(&query)
            .bind(election_id)
            .bind(name)
            .bind(abbreviation)
            .bind(trimmed_description(dto.description.as_deref()))
            .bind(dto.logo_url.filter(|u| !u.trim().is_empty()))
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!(
            "Partylist created: id={}, election={}, abbreviation={}",
            partylist.id,
            election_id,
            partylist.abbreviation
        );
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Partylist,
            ChangeAction::Created,
            partylist.id,
        ));

        Ok(partylist)
    }

    pub async fn update(
        &self,
        election_id: Uuid,
        partylist_id: Uuid,
        dto: UpdatePartylistDto,
    ) -> Result<PartylistUpdate> {
        let current = self.get(election_id, partylist_id).await?;

        let Some(patch) = plan_partylist_update(&current, &dto)? else {
            return Ok(PartylistUpdate {
                partylist: current,
                changed: false,
            });
        };

        if self
            .abbreviation_taken(election_id, &patch.abbreviation, Some(partylist_id))
            .await?
        {
            return Err(abbreviation_taken_error());
        }

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            UPDATE partylists
            SET name = $3, abbreviation = $4, description = $5, updated_at = NOW()
            WHERE id = $1 AND election_id = $2
            RETURNING {}
            "#,
            PARTYLIST_COLUMNS
        );
        let partylist = sqlx::query_as::<_, Partylist>(&query)
            .bind(partylist_id)
            .bind(election_id)
            .bind(&patch.name)
            .bind(&patch.abbreviation)
            .bind(&patch.description)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!("Partylist updated: id={}, election={}", partylist.id, election_id);
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Partylist,
            ChangeAction::Updated,
            partylist.id,
        ));

        Ok(PartylistUpdate {
            partylist,
            changed: true,
        })
    }

    /// Delete a partylist; its candidates move to the independent partylist.
    pub async fn delete(&self, election_id: Uuid, partylist_id: Uuid) -> Result<()> {
        let partylist = self.get(election_id, partylist_id).await?;
        if partylist.is_independent() {
            return Err(AppError::Conflict(
                "The independent partylist cannot be deleted".to_string(),
            ));
        }

        let mut tx = database::begin(&self.pool).await?;

        let independent_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM partylists WHERE election_id = $1 AND UPPER(abbreviation) = $2",
        )
        .bind(election_id)
        .bind(INDEPENDENT_ABBREVIATION)
        .fetch_optional(&mut *tx)
        .await?;
        let independent_id = independent_id.ok_or_else(|| {
            AppError::Internal(format!(
                "Election {} has no independent partylist",
                election_id
            ))
        })?;

        let moved = sqlx::query(
            r#"
            UPDATE candidates SET partylist_id = $3, updated_at = NOW()
            WHERE election_id = $1 AND partylist_id = $2
            "#,
        )
        .bind(election_id)
        .bind(partylist_id)
        .bind(independent_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM partylists WHERE id = $1 AND election_id = $2")
            .bind(partylist_id)
            .bind(election_id)
            .execute(&mut *tx)
            .await?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!(
            "Partylist deleted: id={}, election={}, candidates_moved={}",
            partylist_id,
            election_id,
            moved
        );
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Partylist,
            ChangeAction::Deleted,
            partylist_id,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn partylist(name: &str, abbreviation: &str, description: Option<&str>) -> Partylist {
        Partylist {
            id: Uuid::new_v4(),
            election_id: Uuid::new_v4(),
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            description: description.map(str::to_string),
            logo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn form(name: &str, abbreviation: &str, description: Option<&str>) -> UpdatePartylistDto {
        UpdatePartylistDto {
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_non_constraint_errors_stay_database_errors() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_abbreviation_taken_is_field_error() {
        let err = abbreviation_taken_error();
        assert!(
            matches!(err, AppError::FieldValidation { ref field, .. } if field == "abbreviation")
        );
    }

    #[test]
    fn test_independent_cannot_be_edited() {
        let ind = partylist("Independent", "IND", None);
        let err = plan_partylist_update(&ind, &form("Renamed", "IND", None)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_unchanged_after_trim_is_noop() {
        let current = partylist("Alpha Party", "AP", Some("For all"));
        let plan =
            plan_partylist_update(&current, &form(" Alpha Party ", "AP ", Some(" For all")))
                .unwrap();
        assert!(plan.is_none());

        let no_description = partylist("Alpha Party", "AP", None);
        let plan = plan_partylist_update(&no_description, &form("Alpha Party", "AP", Some("  ")))
            .unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn test_name_and_abbreviation_required() {
        let current = partylist("Alpha Party", "AP", None);
        assert!(plan_partylist_update(&current, &form("  ", "AP", None)).is_err());
        assert!(plan_partylist_update(&current, &form("Alpha", "", None)).is_err());
    }

    #[test]
    fn test_cannot_take_reserved_abbreviation() {
        let current = partylist("Alpha Party", "AP", None);
        let err = plan_partylist_update(&current, &form("Alpha Party", "ind", None)).unwrap_err();
        assert!(matches!(err, AppError::FieldValidation { ref field, .. } if field == "abbreviation"));
    }

    #[test]
    fn test_changed_fields_are_trimmed() {
        let current = partylist("Alpha Party", "AP", None);
        let patch = plan_partylist_update(&current, &form(" Beta Party ", " BP", Some(" New ")))
            .unwrap()
            .unwrap();
        assert_eq!(patch.name, "Beta Party");
        assert_eq!(patch.abbreviation, "BP");
        assert_eq!(patch.description.as_deref(), Some("New"));
    }

    #[test]
    fn test_is_independent_case_insensitive() {
        assert!(is_independent_abbreviation("IND"));
        assert!(is_independent_abbreviation(" ind "));
        assert!(!is_independent_abbreviation("INDIE"));
    }
}
