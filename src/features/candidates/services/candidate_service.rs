use std::sync::Arc;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database;
use crate::core::error::{AppError, Result};
use crate::features::candidates::credentials::Credentials;
use crate::features::candidates::dtos::CreateCandidateDto;
use crate::features::candidates::dtos::UpdateCandidateDto;
use crate::features::candidates::models::Candidate;
use crate::features::candidates::photo::{
    discard_photo_url, stage_photo, write_with_staged_photo, PhotoUpload,
};
use crate::features::candidates::submission::{plan_submission, CandidatePatch, PhotoChange};
use crate::features::elections::{
    touch_election, ChangeAction, ChangeTarget, ElectionEvent, ElectionEvents,
};
use crate::modules::storage::ObjectStorage;
use crate::shared::validation::{capitalize_first_letter, normalize_slug, SLUG_REGEX};

const CANDIDATE_COLUMNS: &str = "id, election_id, position_id, partylist_id, first_name, \
     middle_name, last_name, slug, photo_url, credentials, created_at, updated_at";

const SLUG_CONSTRAINT: &str = "uq_candidates_election_slug";

/// Outcome of a candidate editor submission
#[derive(Debug)]
pub struct CandidateUpdate {
    pub candidate: Candidate,
    /// False when the submission matched the stored candidate and nothing was written
    pub changed: bool,
}

fn slug_taken_error() -> AppError {
    AppError::field("slug", "Slug is already taken")
}

/// Map a unique violation on the slug constraint to the inline field error
fn map_write_error(e: sqlx::Error) -> AppError {
    let is_slug_conflict = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|constraint| constraint == SLUG_CONSTRAINT);
    if is_slug_conflict {
        return slug_taken_error();
    }
    tracing::error!("Failed to write candidate: {:?}", e);
    AppError::Database(e)
}

fn checked_slug(raw: &str) -> Result<String> {
    let slug = normalize_slug(raw);
    if !SLUG_REGEX.is_match(&slug) {
        return Err(AppError::field(
            "slug",
            "Slug may only contain letters, numbers and single dashes",
        ));
    }
    Ok(slug)
}

/// Service for candidates and their photos
pub struct CandidateService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    events: Arc<ElectionEvents>,
}

impl CandidateService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, events: Arc<ElectionEvents>) -> Self {
        Self {
            pool,
            storage,
            events,
        }
    }

    pub async fn list(&self, election_id: Uuid, position_id: Option<Uuid>) -> Result<Vec<Candidate>> {
        let query = format!(
            r#"
            SELECT {}
            FROM candidates
            WHERE election_id = $1 AND ($2::uuid IS NULL OR position_id = $2)
            ORDER BY created_at ASC
            "#,
            CANDIDATE_COLUMNS
        );
        let candidates = sqlx::query_as::<_, Candidate>(&query)
            .bind(election_id)
            .bind(position_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    pub async fn get(&self, election_id: Uuid, candidate_id: Uuid) -> Result<Candidate> {
        let query = format!(
            "SELECT {} FROM candidates WHERE id = $1 AND election_id = $2",
            CANDIDATE_COLUMNS
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(candidate_id)
            .bind(election_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", candidate_id)))
    }

    async fn slug_taken(&self, election_id: Uuid, slug: &str, except: Option<Uuid>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM candidates
                WHERE election_id = $1 AND slug = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(election_id)
        .bind(slug)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Reject positions and partylists that belong to another election
    async fn ensure_membership(
        &self,
        election_id: Uuid,
        position_id: Uuid,
        partylist_id: Uuid,
    ) -> Result<()> {
        let (position_ok, partylist_ok): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM positions WHERE id = $2 AND election_id = $1),
                EXISTS(SELECT 1 FROM partylists WHERE id = $3 AND election_id = $1)
            "#,
        )
        .bind(election_id)
        .bind(position_id)
        .bind(partylist_id)
        .fetch_one(&self.pool)
        .await?;

        if !position_ok {
            return Err(AppError::field(
                "positionId",
                "Position does not belong to this election",
            ));
        }
        if !partylist_ok {
            return Err(AppError::field(
                "partylistId",
                "Partylist does not belong to this election",
            ));
        }
        Ok(())
    }

    pub async fn create(&self, election_id: Uuid, dto: CreateCandidateDto) -> Result<Candidate> {
        let slug = checked_slug(&dto.slug)?;
        if self.slug_taken(election_id, &slug, None).await? {
            return Err(slug_taken_error());
        }
        self.ensure_membership(election_id, dto.position_id, dto.partylist_id)
            .await?;

        let middle_name = dto
            .middle_name
            .as_deref()
            .map(capitalize_first_letter)
            .filter(|m| !m.is_empty());

        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            INSERT INTO candidates
                (election_id, position_id, partylist_id, first_name, middle_name, last_name, slug, credentials)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(election_id)
            .bind(dto.position_id)
            .bind(dto.partylist_id)
            .bind(capitalize_first_letter(&dto.first_name))
            .bind(middle_name)
            .bind(capitalize_first_letter(&dto.last_name))
            .bind(&slug)
            .bind(Json(Credentials::default()))
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        tracing::info!(
            "Candidate created: id={}, election={}, slug={}",
            candidate.id,
            election_id,
            candidate.slug
        );
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Candidate,
            ChangeAction::Created,
            candidate.id,
        ));

        Ok(candidate)
    }

    /// Apply an editor submission.
    ///
    /// Order: plan (no-op check) → slug uniqueness → membership and
    /// credentials → photo upload → transactional write → old photo cleanup.
    pub async fn update(
        &self,
        election_id: Uuid,
        candidate_id: Uuid,
        dto: UpdateCandidateDto,
        photo: Option<PhotoUpload>,
    ) -> Result<CandidateUpdate> {
        let original = self.get(election_id, candidate_id).await?;
        self.submit(original, dto, photo).await
    }

    async fn submit(
        &self,
        original: Candidate,
        dto: UpdateCandidateDto,
        photo: Option<PhotoUpload>,
    ) -> Result<CandidateUpdate> {
        let (election_id, candidate_id) = (original.election_id, original.id);

        let Some(plan) = plan_submission(&original, dto, photo.is_some()) else {
            tracing::debug!("Candidate {} submission unchanged, skipping write", candidate_id);
            return Ok(CandidateUpdate {
                candidate: original,
                changed: false,
            });
        };

        if plan.slug_changed {
            if !SLUG_REGEX.is_match(&plan.patch.slug) {
                return Err(AppError::field(
                    "slug",
                    "Slug may only contain letters, numbers and single dashes",
                ));
            }
            if self
                .slug_taken(election_id, &plan.patch.slug, Some(candidate_id))
                .await?
            {
                return Err(slug_taken_error());
            }
        }

        self.ensure_membership(election_id, plan.patch.position_id, plan.patch.partylist_id)
            .await?;
        plan.patch.credentials.validate()?;

        let staged = match photo {
            Some(photo) => {
                Some(stage_photo(self.storage.as_ref(), election_id, candidate_id, photo).await?)
            }
            None => None,
        };

        let photo_url = match plan.photo {
            PhotoChange::Replace => staged.as_ref().map(|s| s.url.clone()),
            PhotoChange::Clear => None,
            PhotoChange::Keep => original.photo_url.clone(),
        };

        let patch = &plan.patch;
        let updated = write_with_staged_photo(self.storage.as_ref(), staged.as_ref(), move || {
            self.write_update(election_id, candidate_id, patch, photo_url)
        })
        .await?;

        if plan.photo != PhotoChange::Keep {
            if let Some(old_url) = original.photo_url.as_deref() {
                if updated.photo_url.as_deref() != Some(old_url) {
                    discard_photo_url(self.storage.as_ref(), old_url).await;
                }
            }
        }

        tracing::info!(
            "Candidate updated: id={}, election={}, slug={}",
            updated.id,
            election_id,
            updated.slug
        );
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Candidate,
            ChangeAction::Updated,
            updated.id,
        ));

        Ok(CandidateUpdate {
            candidate: updated,
            changed: true,
        })
    }

    /// Candidate patch and election touch in one transaction
    async fn write_update(
        &self,
        election_id: Uuid,
        candidate_id: Uuid,
        patch: &CandidatePatch,
        photo_url: Option<String>,
    ) -> Result<Candidate> {
        let mut tx = database::begin(&self.pool).await?;

        let query = format!(
            r#"
            UPDATE candidates
            SET first_name = $3, middle_name = $4, last_name = $5, slug = $6,
                position_id = $7, partylist_id = $8, credentials = $9, photo_url = $10,
                updated_at = NOW()
            WHERE id = $1 AND election_id = $2
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(candidate_id)
            .bind(election_id)
            .bind(&patch.first_name)
            .bind(&patch.middle_name)
            .bind(&patch.last_name)
            .bind(&patch.slug)
            .bind(patch.position_id)
            .bind(patch.partylist_id)
            .bind(Json(&patch.credentials))
            .bind(photo_url)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", candidate_id)))?;

        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        Ok(candidate)
    }

    /// Delete the candidate document, then its stored photo.
    pub async fn delete(&self, election_id: Uuid, candidate_id: Uuid) -> Result<()> {
        let candidate = self.get(election_id, candidate_id).await?;

        let mut tx = database::begin(&self.pool).await?;
        sqlx::query("DELETE FROM candidates WHERE id = $1 AND election_id = $2")
            .bind(candidate_id)
            .bind(election_id)
            .execute(&mut *tx)
            .await?;
        touch_election(&mut tx, election_id).await?;
        database::commit(tx).await?;

        if let Some(url) = candidate.photo_url.as_deref() {
            discard_photo_url(self.storage.as_ref(), url).await;
        }

        tracing::info!("Candidate deleted: id={}, election={}", candidate_id, election_id);
        self.events.publish(ElectionEvent::new(
            election_id,
            ChangeTarget::Candidate,
            ChangeAction::Deleted,
            candidate_id,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_slug() {
        assert_eq!(checked_slug("John-").unwrap(), "john");
        assert_eq!(checked_slug("Juan Dela Cruz").unwrap(), "juan-dela-cruz");
        assert!(checked_slug("juan/../x").is_err());
    }

    #[test]
    fn test_non_constraint_errors_stay_database_errors() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }

    mod sequencing {
        use super::*;
        use crate::features::candidates::credentials::{
            Achievement, CredentialChange, CredentialEdit, CredentialList,
        };
        use crate::modules::storage::InMemoryStorage;
        use chrono::Utc;
        use sqlx::postgres::PgPoolOptions;
        use std::time::Duration;

        // Nothing listens on this port, so any query fails.
        fn service(storage: Arc<InMemoryStorage>) -> CandidateService {
            let pool = PgPoolOptions::new()
                .acquire_timeout(Duration::from_millis(200))
                .connect_lazy("postgres://localhost:1/unused")
                .unwrap();
            CandidateService::new(pool, storage, Arc::new(ElectionEvents::new(4)))
        }

        fn stored() -> Candidate {
            Candidate {
                id: Uuid::new_v4(),
                election_id: Uuid::new_v4(),
                position_id: Uuid::new_v4(),
                partylist_id: Uuid::new_v4(),
                first_name: "Juan".to_string(),
                middle_name: None,
                last_name: "Dela Cruz".to_string(),
                slug: "juan".to_string(),
                photo_url: None,
                credentials: Json(Credentials {
                    achievements: vec![Achievement {
                        id: Uuid::new_v4(),
                        title: "Dean's lister".to_string(),
                    }],
                    ..Default::default()
                }),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        }

        fn draft_of(candidate: &Candidate) -> UpdateCandidateDto {
            UpdateCandidateDto {
                first_name: candidate.first_name.clone(),
                middle_name: candidate.middle_name.clone(),
                last_name: candidate.last_name.clone(),
                slug: candidate.slug.clone(),
                position_id: candidate.position_id,
                partylist_id: candidate.partylist_id,
                credentials: None,
                credential_edits: Vec::new(),
                remove_photo: false,
            }
        }

        fn jpeg() -> PhotoUpload {
            PhotoUpload {
                data: vec![0xFF, 0xD8, 0xFF, 0xE0],
                content_type: "image/jpeg".to_string(),
            }
        }

        #[tokio::test]
        async fn test_unchanged_submission_writes_nothing() {
            let storage = Arc::new(InMemoryStorage::new());
            let service = service(Arc::clone(&storage));
            let candidate = stored();

            let mut draft = draft_of(&candidate);
            draft.first_name = "juan".to_string();
            draft.credential_edits = vec![CredentialEdit::Append {
                list: CredentialList::Achievements,
                id: None,
            }];

            let outcome = service.submit(candidate.clone(), draft, None).await.unwrap();
            assert!(!outcome.changed);
            assert_eq!(outcome.candidate.id, candidate.id);
            assert_eq!(outcome.candidate.credentials.0, candidate.credentials.0);
            assert!(storage.is_empty());
        }

        #[tokio::test]
        async fn test_invalid_slug_aborts_before_upload() {
            let storage = Arc::new(InMemoryStorage::new());
            let service = service(Arc::clone(&storage));
            let candidate = stored();

            let mut draft = draft_of(&candidate);
            draft.slug = "juan/../admin".to_string();

            let err = service
                .submit(candidate, draft, Some(jpeg()))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::FieldValidation { ref field, .. } if field == "slug"));
            assert!(storage.is_empty());
        }

        #[tokio::test]
        async fn test_failed_lookup_aborts_before_upload() {
            let storage = Arc::new(InMemoryStorage::new());
            let service = service(Arc::clone(&storage));
            let candidate = stored();

            let id = Uuid::new_v4();
            let mut draft = draft_of(&candidate);
            draft.slug = "juan-2".to_string();
            draft.credential_edits = vec![
                CredentialEdit::Append {
                    list: CredentialList::Achievements,
                    id: Some(id),
                },
                CredentialEdit::Edit {
                    id,
                    change: CredentialChange::AchievementTitle("Valedictorian".to_string()),
                },
            ];

            // the slug lookup cannot reach the database, so nothing is uploaded
            assert!(service.submit(candidate, draft, Some(jpeg())).await.is_err());
            assert!(storage.is_empty());
        }
    }
}
