//! Planning of candidate editor submissions.
//!
//! Turns a submitted draft into the normalized patch that will be written,
//! or into nothing at all when the submission would not change the stored
//! candidate. Planning is pure; the service performs the writes.

use uuid::Uuid;

use crate::features::candidates::credentials::Credentials;
use crate::features::candidates::dtos::UpdateCandidateDto;
use crate::features::candidates::models::Candidate;
use crate::shared::validation::{capitalize_first_letter, normalize_slug};

/// Candidate fields as they are written by an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePatch {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub slug: String,
    pub position_id: Uuid,
    pub partylist_id: Uuid,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoChange {
    Keep,
    Replace,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub patch: CandidatePatch,
    pub slug_changed: bool,
    pub photo: PhotoChange,
}

impl CandidatePatch {
    /// Replay the draft's credential edits, then normalize names and slug.
    ///
    /// Edits apply to the submitted document, or to `stored` when the draft
    /// carries none.
    pub fn from_draft(dto: UpdateCandidateDto, stored: &Credentials) -> Self {
        let mut credentials = dto.credentials.unwrap_or_else(|| stored.clone());
        for edit in dto.credential_edits {
            credentials.apply(edit);
        }

        Self {
            first_name: capitalize_first_letter(&dto.first_name),
            middle_name: dto
                .middle_name
                .map(|m| capitalize_first_letter(&m))
                .filter(|m| !m.is_empty()),
            last_name: capitalize_first_letter(&dto.last_name),
            slug: normalize_slug(&dto.slug),
            position_id: dto.position_id,
            partylist_id: dto.partylist_id,
            credentials: credentials.without_blanks(),
        }
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.first_name == candidate.first_name
            && self.middle_name == candidate.middle_name
            && self.last_name == candidate.last_name
            && self.slug == candidate.slug
            && self.position_id == candidate.position_id
            && self.partylist_id == candidate.partylist_id
            && self.credentials == candidate.credentials.0
    }
}

/// Plan an update of `original`; `None` means the submission writes nothing.
pub fn plan_submission(
    original: &Candidate,
    dto: UpdateCandidateDto,
    has_new_photo: bool,
) -> Option<SubmissionPlan> {
    let remove_photo = dto.remove_photo;
    let patch = CandidatePatch::from_draft(dto, &original.credentials.0);

    let photo = if has_new_photo {
        PhotoChange::Replace
    } else if remove_photo && original.photo_url.is_some() {
        PhotoChange::Clear
    } else {
        PhotoChange::Keep
    };

    if photo == PhotoChange::Keep && patch.matches(original) {
        return None;
    }

    Some(SubmissionPlan {
        slug_changed: patch.slug != original.slug,
        patch,
        photo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::candidates::credentials::{
        Achievement, CredentialChange, CredentialEdit, CredentialList,
    };
    use chrono::Utc;
    use sqlx::types::Json;

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
            photo_url: Some("http://storage.test/bucket/public/old.jpg".to_string()),
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
            credentials: Some(candidate.credentials.0.clone()),
            credential_edits: Vec::new(),
            remove_photo: false,
        }
    }

    #[test]
    fn test_unchanged_draft_without_photo_is_noop() {
        let candidate = stored();
        assert!(plan_submission(&candidate, draft_of(&candidate), false).is_none());
    }

    #[test]
    fn test_unchanged_draft_with_photo_is_planned() {
        let candidate = stored();
        let plan = plan_submission(&candidate, draft_of(&candidate), true).unwrap();
        assert_eq!(plan.photo, PhotoChange::Replace);
        assert!(!plan.slug_changed);
    }

    #[test]
    fn test_draft_equal_after_normalization_is_noop() {
        let candidate = stored();
        let mut draft = draft_of(&candidate);
        draft.first_name = "juan".to_string();
        draft.slug = "juan-".to_string();
        draft.credential_edits.push(CredentialEdit::Append {
            list: CredentialList::Affiliations,
            id: None,
        });
        assert!(plan_submission(&candidate, draft, false).is_none());
    }

    #[test]
    fn test_trailing_dash_slug_is_stripped() {
        let candidate = stored();
        let mut draft = draft_of(&candidate);
        draft.slug = "john-".to_string();

        let plan = plan_submission(&candidate, draft, false).unwrap();
        assert_eq!(plan.patch.slug, "john");
        assert!(plan.slug_changed);
    }

    #[test]
    fn test_names_are_capitalized() {
        let candidate = stored();
        let mut draft = draft_of(&candidate);
        draft.first_name = "maria".to_string();
        draft.middle_name = Some("  ".to_string());
        draft.last_name = "santos".to_string();

        let plan = plan_submission(&candidate, draft, false).unwrap();
        assert_eq!(plan.patch.first_name, "Maria");
        assert_eq!(plan.patch.middle_name, None);
        assert_eq!(plan.patch.last_name, "Santos");
    }

    #[test]
    fn test_remove_photo_only_when_present() {
        let mut candidate = stored();
        let mut draft = draft_of(&candidate);
        draft.remove_photo = true;

        let plan = plan_submission(&candidate, draft.clone(), false).unwrap();
        assert_eq!(plan.photo, PhotoChange::Clear);

        candidate.photo_url = None;
        assert!(plan_submission(&candidate, draft, false).is_none());
    }

    #[test]
    fn test_credential_edits_are_replayed() {
        let candidate = stored();
        let mut draft = draft_of(&candidate);
        let id = Uuid::new_v4();
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

        let plan = plan_submission(&candidate, draft, false).unwrap();
        assert_eq!(plan.patch.credentials.achievements.len(), 2);
        assert_eq!(plan.patch.credentials.achievements[1].id, id);
        assert_eq!(plan.photo, PhotoChange::Keep);
    }

    #[test]
    fn test_edits_without_document_apply_to_stored_credentials() {
        let candidate = stored();
        let kept = candidate.credentials.0.achievements[0].clone();
        let mut draft = draft_of(&candidate);
        draft.credentials = None;
        draft.credential_edits = vec![CredentialEdit::Append {
            list: CredentialList::Achievements,
            id: None,
        }];

        // the appended entry is blank and dropped, leaving the stored document as is
        assert!(plan_submission(&candidate, draft.clone(), false).is_none());

        let id = Uuid::new_v4();
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
        let plan = plan_submission(&candidate, draft, false).unwrap();
        assert_eq!(plan.patch.credentials.achievements.len(), 2);
        assert_eq!(plan.patch.credentials.achievements[0], kept);
        assert_eq!(plan.patch.credentials.achievements[1].title, "Valedictorian");
    }

    #[test]
    fn test_explicit_empty_document_clears_credentials() {
        let candidate = stored();
        let mut draft = draft_of(&candidate);
        draft.credentials = Some(Credentials::default());

        let plan = plan_submission(&candidate, draft, false).unwrap();
        assert!(plan.patch.credentials.achievements.is_empty());
    }
}
