use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::{self, PgTransaction};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::candidates::photo::discard_photo_url;
use crate::features::elections::dtos::{CreateElectionDto, UpdateElectionDto};
use crate::features::elections::events::{
    ChangeAction, ChangeTarget, ElectionEvent, ElectionEvents,
};
use crate::features::elections::models::Election;
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::{INDEPENDENT_ABBREVIATION, INDEPENDENT_NAME};
use crate::shared::validation::{normalize_slug, SLUG_REGEX};

const ELECTION_COLUMNS: &str =
    "id, name, slug, start_date, end_date, logo_url, created_at, updated_at";

const SLUG_CONSTRAINT: &str = "elections_slug_key";

fn slug_taken_error() -> AppError {
    AppError::field("slug", "Slug is already taken")
}

/// A concurrent insert can still hit the unique slug constraint
fn map_write_error(e: sqlx::Error) -> AppError {
    let is_slug_conflict = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|constraint| constraint == SLUG_CONSTRAINT);
    if is_slug_conflict {
        return slug_taken_error();
    }
    tracing::error!("Failed to write election: {:?}", e);
    AppError::Database(e)
}

/// Bump the parent election's `updated_at` inside an admin write.
pub async fn touch_election(tx: &mut PgTransaction, election_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE elections SET updated_at = NOW() WHERE id = $1")
        .bind(election_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to touch election {}: {:?}", election_id, e);
            AppError::Database(e)
        })?;
    Ok(())
}

/// Dashboard path for an admin given their first election, if any.
pub fn admin_landing_path(first_slug: Option<&str>) -> String {
    match first_slug {
        Some(slug) => format!("/{}/dashboard", slug),
        None => "/create-election".to_string(),
    }
}

/// Normalize a slug and reject what the public URL scheme cannot carry.
pub fn prepare_slug(raw: &str) -> Result<String> {
    let slug = normalize_slug(raw);
    if !SLUG_REGEX.is_match(&slug) {
        return Err(AppError::field(
            "slug",
            "Slug may only contain letters, numbers and single dashes",
        ));
    }
    Ok(slug)
}

/// Service for elections and the commissioner ownership claim
pub struct ElectionService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    events: Arc<ElectionEvents>,
}

impl ElectionService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, events: Arc<ElectionEvents>) -> Self {
        Self {
            pool,
            storage,
            events,
        }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Election>> {
        let query = format!("SELECT {} FROM elections WHERE slug = $1", ELECTION_COLUMNS);
        let election = sqlx::query_as::<_, Election>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(election)
    }

    pub async fn is_commissioner(&self, election_id: Uuid, account_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM commissioners WHERE election_id = $1 AND account_id = $2)",
        )
        .bind(election_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Elections the account is a commissioner of, oldest first
    pub async fn list_for_account(&self, account_id: &str) -> Result<Vec<Election>> {
        let elections = sqlx::query_as::<_, Election>(
            r#"
            SELECT e.id, e.name, e.slug, e.start_date, e.end_date, e.logo_url,
                   e.created_at, e.updated_at
            FROM elections e
            JOIN commissioners c ON c.election_id = e.id
            WHERE c.account_id = $1
            ORDER BY e.created_at ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(elections)
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM elections WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    /// Create an election owned by `account_id`, together with its
    /// commissioner row and the default independent partylist.
    pub async fn create(&self, account_id: &str, dto: CreateElectionDto) -> Result<Election> {
        let slug = prepare_slug(&dto.slug)?;
        if dto.end_date < dto.start_date {
            return Err(AppError::field(
                "endDate",
                "End date must not be before the start date",
            ));
        }
        if self.slug_taken(&slug).await? {
            return Err(slug_taken_error());
        }

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            INSERT INTO elections (name, slug, start_date, end_date, logo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ELECTION_COLUMNS
        );
        let election = sqlx::query_as::<_, Election>(&query)
            .bind(dto.name.trim())
            .bind(&slug)
            .bind(dto.start_date)
            .bind(dto.end_date)
            .bind(dto.logo_url.filter(|u| !u.trim().is_empty()))
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        sqlx::query("INSERT INTO commissioners (election_id, account_id) VALUES ($1, $2)")
            .bind(election.id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO partylists (election_id, name, abbreviation) VALUES ($1, $2, $3)",
        )
        .bind(election.id)
        .bind(INDEPENDENT_NAME)
        .bind(INDEPENDENT_ABBREVIATION)
        .execute(&mut *tx)
        .await?;

        database::commit(tx).await?;

        tracing::info!(
            "Election created: id={}, slug={}, owner={}",
            election.id,
            election.slug,
            account_id
        );
        self.events.publish(ElectionEvent::new(
            election.id,
            ChangeTarget::Election,
            ChangeAction::Created,
            election.id,
        ));

        Ok(election)
    }

    pub async fn update(&self, election: &Election, dto: UpdateElectionDto) -> Result<Election> {
        let slug = match dto.slug.as_deref() {
            Some(raw) => {
                let slug = prepare_slug(raw)?;
                if slug != election.slug && self.slug_taken(&slug).await? {
                    return Err(slug_taken_error());
                }
                slug
            }
            None => election.slug.clone(),
        };

        let start_date = dto.start_date.unwrap_or(election.start_date);
        let end_date = dto.end_date.unwrap_or(election.end_date);
        if end_date < start_date {
            return Err(AppError::field(
                "endDate",
                "End date must not be before the start date",
            ));
        }

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| election.name.clone());
        let logo_url = match dto.logo_url {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url),
            None => election.logo_url.clone(),
        };

        let query = format!(
            r#"
            UPDATE elections
            SET name = $2, slug = $3, start_date = $4, end_date = $5, logo_url = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ELECTION_COLUMNS
        );
        let updated = sqlx::query_as::<_, Election>(&query)
            .bind(election.id)
            .bind(&name)
            .bind(&slug)
            .bind(start_date)
            .bind(end_date)
            .bind(logo_url)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        tracing::info!("Election updated: id={}, slug={}", updated.id, updated.slug);
        self.events.publish(ElectionEvent::new(
            updated.id,
            ChangeTarget::Election,
            ChangeAction::Updated,
            updated.id,
        ));

        Ok(updated)
    }

    /// Delete an election; its collections go with it through cascades,
    /// then the candidate photos are removed from storage.
    pub async fn delete(&self, election: &Election) -> Result<()> {
        let mut tx = database::begin(&self.pool).await?;

        let photo_urls: Vec<String> = sqlx::query_scalar(
            "SELECT photo_url FROM candidates WHERE election_id = $1 AND photo_url IS NOT NULL",
        )
        .bind(election.id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM elections WHERE id = $1")
            .bind(election.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Election '{}' not found",
                election.slug
            )));
        }
        database::commit(tx).await?;

        for url in &photo_urls {
            discard_photo_url(self.storage.as_ref(), url).await;
        }

        tracing::info!(
            "Election deleted: id={}, slug={}, photos={}",
            election.id,
            election.slug,
            photo_urls.len()
        );
        self.events.publish(ElectionEvent::new(
            election.id,
            ChangeTarget::Election,
            ChangeAction::Deleted,
            election.id,
        ));
        Ok(())
    }

    /// Resolve where the dashboard entry point should send this account.
    pub async fn landing(&self, user: &AuthenticatedUser) -> Result<String> {
        if user.is_voter() && !user.is_admin() {
            let election_id = user.election_id.ok_or_else(|| {
                AppError::Forbidden("Voter session is not bound to an election".to_string())
            })?;
            let slug: Option<String> =
                sqlx::query_scalar("SELECT slug FROM elections WHERE id = $1")
                    .bind(election_id)
                    .fetch_optional(&self.pool)
                    .await?;
            let slug = slug.ok_or_else(|| {
                AppError::NotFound(format!("Election {} not found", election_id))
            })?;
            return Ok(format!("/{}", slug));
        }

        let elections = self.list_for_account(&user.account_id).await?;
        Ok(admin_landing_path(
            elections.first().map(|e| e.slug.as_str()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_landing_without_elections() {
        assert_eq!(admin_landing_path(None), "/create-election");
    }

    #[test]
    fn test_admin_landing_first_election() {
        assert_eq!(admin_landing_path(Some("ssc-2023")), "/ssc-2023/dashboard");
    }

    #[test]
    fn test_prepare_slug_normalizes() {
        assert_eq!(prepare_slug("SSC 2023-").unwrap(), "ssc-2023");
    }

    #[test]
    fn test_other_write_errors_stay_database_errors() {
        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_prepare_slug_rejects_symbols() {
        let err = prepare_slug("ssc_2023!").unwrap_err();
        assert!(matches!(err, AppError::FieldValidation { ref field, .. } if field == "slug"));
        assert!(prepare_slug("   ").is_err());
    }
}
