//! Candidate photo staging.
//!
//! A new photo is uploaded under a fresh versioned key before the database
//! write. If the write fails the staged object is deleted again; once the
//! write commits, the superseded object is deleted. Deletion failures only
//! leave an orphaned object behind and are logged.

use std::future::Future;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::candidates::dtos::{photo_extension, ALLOWED_PHOTO_TYPES, MAX_PHOTO_SIZE};
use crate::modules::storage::ObjectStorage;

/// Photo bytes received with a candidate submission
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// A photo uploaded ahead of the database write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPhoto {
    pub key: String,
    pub url: String,
}

impl PhotoUpload {
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(AppError::field("photo", "Photo is empty"));
        }
        if self.data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::field(
                "photo",
                &format!(
                    "Photo too large. Maximum size is {} MB",
                    MAX_PHOTO_SIZE / 1024 / 1024
                ),
            ));
        }
        if photo_extension(&self.content_type).is_none() {
            return Err(AppError::field(
                "photo",
                &format!(
                    "Photo type '{}' is not allowed. Allowed types: {}",
                    self.content_type,
                    ALLOWED_PHOTO_TYPES.join(", ")
                ),
            ));
        }
        Ok(())
    }
}

/// Object path of a new photo version, relative to the public prefix
pub fn photo_path(election_id: Uuid, candidate_id: Uuid, extension: &str) -> String {
    format!(
        "elections/{}/candidates/{}/{}.{}",
        election_id,
        candidate_id,
        Uuid::now_v7(),
        extension
    )
}

/// Upload `photo` under a fresh key for the candidate.
pub async fn stage_photo(
    storage: &dyn ObjectStorage,
    election_id: Uuid,
    candidate_id: Uuid,
    photo: PhotoUpload,
) -> Result<StagedPhoto> {
    photo.validate()?;
    let extension = photo_extension(&photo.content_type)
        .ok_or_else(|| AppError::field("photo", "Unsupported photo type"))?;

    let key = storage.public_key(&photo_path(election_id, candidate_id, extension));
    let key = storage.upload(&key, photo.data, &photo.content_type).await?;
    let url = storage.url_for(&key);

    tracing::debug!("Staged candidate photo {} for candidate {}", key, candidate_id);
    Ok(StagedPhoto { key, url })
}

/// Delete a stored photo by its URL; failures are logged and swallowed.
pub async fn discard_photo_url(storage: &dyn ObjectStorage, url: &str) {
    match storage.key_from_url(url) {
        Some(key) => discard_key(storage, &key).await,
        None => tracing::debug!("Photo URL {} is not managed by storage, skipping delete", url),
    }
}

async fn discard_key(storage: &dyn ObjectStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        tracing::warn!("Failed to delete photo object '{}': {}", key, e);
    }
}

/// Run `write` with the staged photo; delete the staged object if it fails.
pub async fn write_with_staged_photo<T, F, Fut>(
    storage: &dyn ObjectStorage,
    staged: Option<&StagedPhoto>,
    write: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match write().await {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Some(staged) = staged {
                tracing::warn!(
                    "Candidate write failed, removing staged photo {}",
                    staged.key
                );
                discard_key(storage, &staged.key).await;
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::InMemoryStorage;

    fn jpeg() -> PhotoUpload {
        PhotoUpload {
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
            content_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn test_photo_path_is_versioned() {
        let election = Uuid::new_v4();
        let candidate = Uuid::new_v4();
        let first = photo_path(election, candidate, "jpg");
        let second = photo_path(election, candidate, "jpg");

        assert!(first.starts_with(&format!("elections/{}/candidates/{}/", election, candidate)));
        assert!(first.ends_with(".jpg"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_validate_rejects_bad_uploads() {
        let mut photo = jpeg();
        photo.content_type = "application/pdf".to_string();
        assert!(photo.validate().is_err());

        let empty = PhotoUpload {
            data: Vec::new(),
            content_type: "image/png".to_string(),
        };
        assert!(empty.validate().is_err());

        let huge = PhotoUpload {
            data: vec![0; MAX_PHOTO_SIZE + 1],
            content_type: "image/png".to_string(),
        };
        assert!(huge.validate().is_err());
    }

    #[tokio::test]
    async fn test_stage_photo_uploads_under_public_prefix() {
        let storage = InMemoryStorage::new();
        let staged = stage_photo(&storage, Uuid::new_v4(), Uuid::new_v4(), jpeg())
            .await
            .unwrap();

        assert!(staged.key.starts_with("public/elections/"));
        assert!(storage.contains(&staged.key));
        assert_eq!(storage.key_from_url(&staged.url), Some(staged.key.clone()));
    }

    #[tokio::test]
    async fn test_failed_upload_surfaces_error() {
        let storage = InMemoryStorage::failing();
        let result = stage_photo(&storage, Uuid::new_v4(), Uuid::new_v4(), jpeg()).await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_removes_staged_photo() {
        let storage = InMemoryStorage::new();
        let staged = stage_photo(&storage, Uuid::new_v4(), Uuid::new_v4(), jpeg())
            .await
            .unwrap();
        assert!(storage.contains(&staged.key));

        let result: Result<()> = write_with_staged_photo(&storage, Some(&staged), || async {
            Err(AppError::Internal("transaction aborted".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert!(!storage.contains(&staged.key));
    }

    #[tokio::test]
    async fn test_successful_write_keeps_staged_photo() {
        let storage = InMemoryStorage::new();
        let staged = stage_photo(&storage, Uuid::new_v4(), Uuid::new_v4(), jpeg())
            .await
            .unwrap();

        let value = write_with_staged_photo(&storage, Some(&staged), || async { Ok(7) })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert!(storage.contains(&staged.key));
    }

    #[tokio::test]
    async fn test_discard_photo_url_ignores_foreign_urls() {
        let storage = InMemoryStorage::new();
        storage.insert("public/elections/a/candidates/b/c.jpg", b"x");

        discard_photo_url(&storage, "https://cdn.example.com/c.jpg").await;
        assert_eq!(storage.len(), 1);

        discard_photo_url(
            &storage,
            "http://storage.test/bucket/public/elections/a/candidates/b/c.jpg",
        )
        .await;
        assert!(storage.is_empty());
    }
}
