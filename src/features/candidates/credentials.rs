//! Candidate credential lists and their editing rules.
//!
//! A candidate carries three independent ordered lists (achievements,
//! affiliations, seminars attended). The dashboard edits a draft of all
//! three and submits the whole document with the candidate. The rules here
//! are pure state transitions over that draft:
//!
//! - append pushes a fresh blank entry unless the last entry is still blank
//! - edit replaces one field of the entry with the given id
//! - remove drops the entry with the given id, keeping the others in order
//!
//! Unknown ids are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Behaviour shared by the entries of every credential list
pub trait CredentialEntry {
    fn id(&self) -> Uuid;

    /// A new entry in its default state
    fn blank(id: Uuid) -> Self;

    /// Whether the entry is still in its default state
    fn is_blank(&self) -> bool;

    fn start_date(&self) -> Option<NaiveDate> {
        None
    }

    fn end_date(&self) -> Option<NaiveDate> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Affiliation {
    pub id: Uuid,
    pub organization_name: String,
    pub position: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Seminar {
    pub id: Uuid,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl CredentialEntry for Achievement {
    fn id(&self) -> Uuid {
        self.id
    }

    fn blank(id: Uuid) -> Self {
        Self {
            id,
            title: String::new(),
        }
    }

    fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}

impl CredentialEntry for Affiliation {
    fn id(&self) -> Uuid {
        self.id
    }

    fn blank(id: Uuid) -> Self {
        Self {
            id,
            organization_name: String::new(),
            position: String::new(),
            start_date: None,
            end_date: None,
        }
    }

    fn is_blank(&self) -> bool {
        self.organization_name.trim().is_empty()
            && self.position.trim().is_empty()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

impl CredentialEntry for Seminar {
    fn id(&self) -> Uuid {
        self.id
    }

    fn blank(id: Uuid) -> Self {
        Self {
            id,
            name: String::new(),
            start_date: None,
            end_date: None,
        }
    }

    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.start_date.is_none() && self.end_date.is_none()
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

/// Push a blank entry unless the last one is still blank.
///
/// Returns the id of the new entry, or `None` when nothing was appended.
/// `preferred_id` is used when it does not collide with an existing entry.
pub fn append_entry<T: CredentialEntry>(list: &mut Vec<T>, preferred_id: Option<Uuid>) -> Option<Uuid> {
    if list.last().is_some_and(|last| last.is_blank()) {
        return None;
    }

    let id = match preferred_id {
        Some(id) if !list.iter().any(|entry| entry.id() == id) => id,
        _ => Uuid::new_v4(),
    };
    list.push(T::blank(id));
    Some(id)
}

/// Apply `change` to the entry with `id`. Returns whether an entry matched.
pub fn edit_entry<T: CredentialEntry>(list: &mut [T], id: Uuid, change: impl FnOnce(&mut T)) -> bool {
    match list.iter_mut().find(|entry| entry.id() == id) {
        Some(entry) => {
            change(entry);
            true
        }
        None => false,
    }
}

/// Drop the entry with `id`. Returns whether an entry was removed.
pub fn remove_entry<T: CredentialEntry>(list: &mut Vec<T>, id: Uuid) -> bool {
    let before = list.len();
    list.retain(|entry| entry.id() != id);
    list.len() != before
}

/// The three credential lists stored with a candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
    #[serde(default)]
    pub seminars_attended: Vec<Seminar>,
}

/// Which credential list an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CredentialList {
    Achievements,
    Affiliations,
    SeminarsAttended,
}

/// A single field change; the variant determines the list it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum CredentialChange {
    AchievementTitle(String),
    AffiliationOrganizationName(String),
    AffiliationPosition(String),
    AffiliationStartDate(Option<NaiveDate>),
    AffiliationEndDate(Option<NaiveDate>),
    SeminarName(String),
    SeminarStartDate(Option<NaiveDate>),
    SeminarEndDate(Option<NaiveDate>),
}

/// One step of draft editing, replayed in order on top of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum CredentialEdit {
    Append {
        list: CredentialList,
        /// Client-chosen id for the new entry, so later edits can target it
        #[serde(default)]
        id: Option<Uuid>,
    },
    Edit {
        id: Uuid,
        change: CredentialChange,
    },
    Remove {
        list: CredentialList,
        id: Uuid,
    },
}

impl Credentials {
    pub fn append(&mut self, list: CredentialList, preferred_id: Option<Uuid>) -> Option<Uuid> {
        match list {
            CredentialList::Achievements => append_entry(&mut self.achievements, preferred_id),
            CredentialList::Affiliations => append_entry(&mut self.affiliations, preferred_id),
            CredentialList::SeminarsAttended => {
                append_entry(&mut self.seminars_attended, preferred_id)
            }
        }
    }

    pub fn edit(&mut self, id: Uuid, change: CredentialChange) -> bool {
        match change {
            CredentialChange::AchievementTitle(title) => {
                edit_entry(&mut self.achievements, id, |a| a.title = title)
            }
            CredentialChange::AffiliationOrganizationName(name) => {
                edit_entry(&mut self.affiliations, id, |a| a.organization_name = name)
            }
            CredentialChange::AffiliationPosition(position) => {
                edit_entry(&mut self.affiliations, id, |a| a.position = position)
            }
            CredentialChange::AffiliationStartDate(date) => {
                edit_entry(&mut self.affiliations, id, |a| a.start_date = date)
            }
            CredentialChange::AffiliationEndDate(date) => {
                edit_entry(&mut self.affiliations, id, |a| a.end_date = date)
            }
            CredentialChange::SeminarName(name) => {
                edit_entry(&mut self.seminars_attended, id, |s| s.name = name)
            }
            CredentialChange::SeminarStartDate(date) => {
                edit_entry(&mut self.seminars_attended, id, |s| s.start_date = date)
            }
            CredentialChange::SeminarEndDate(date) => {
                edit_entry(&mut self.seminars_attended, id, |s| s.end_date = date)
            }
        }
    }

    pub fn remove(&mut self, list: CredentialList, id: Uuid) -> bool {
        match list {
            CredentialList::Achievements => remove_entry(&mut self.achievements, id),
            CredentialList::Affiliations => remove_entry(&mut self.affiliations, id),
            CredentialList::SeminarsAttended => remove_entry(&mut self.seminars_attended, id),
        }
    }

    pub fn apply(&mut self, edit: CredentialEdit) -> Option<Uuid> {
        match edit {
            CredentialEdit::Append { list, id } => self.append(list, id),
            CredentialEdit::Edit { id, change } => {
                self.edit(id, change);
                None
            }
            CredentialEdit::Remove { list, id } => {
                self.remove(list, id);
                None
            }
        }
    }

    /// Copy of the document with blank entries dropped, as it is stored.
    pub fn without_blanks(&self) -> Self {
        Self {
            achievements: non_blank(&self.achievements),
            affiliations: non_blank(&self.affiliations),
            seminars_attended: non_blank(&self.seminars_attended),
        }
    }

    /// Reject duplicate ids and inconsistent date ranges.
    pub fn validate(&self) -> Result<()> {
        validate_list("credentials.achievements", &self.achievements)?;
        validate_list("credentials.affiliations", &self.affiliations)?;
        validate_list("credentials.seminarsAttended", &self.seminars_attended)?;
        Ok(())
    }
}

fn non_blank<T: CredentialEntry + Clone>(list: &[T]) -> Vec<T> {
    list.iter().filter(|entry| !entry.is_blank()).cloned().collect()
}

fn validate_list<T: CredentialEntry>(field: &str, list: &[T]) -> Result<()> {
    let mut seen = HashSet::with_capacity(list.len());
    for entry in list {
        if !seen.insert(entry.id()) {
            return Err(AppError::field(field, "Entries must have unique ids"));
        }
        match (entry.start_date(), entry.end_date()) {
            (None, Some(_)) => {
                return Err(AppError::field(field, "End date requires a start date"));
            }
            (Some(start), Some(end)) if end < start => {
                return Err(AppError::field(
                    field,
                    "End date must not be before the start date",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Word;
    use fake::Fake;

    fn achievement(title: &str) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            title: title.to_string(),
        }
    }

    fn date(year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 1, 1)
    }

    #[test]
    fn test_append_after_filled_achievement() {
        let mut list = vec![achievement("A")];
        let id = append_entry(&mut list, None).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, id);
        assert!(list[1].is_blank());
        assert_ne!(list[0].id, id);
    }

    #[test]
    fn test_append_after_blank_achievement_is_noop() {
        let mut list = vec![achievement("")];
        assert!(append_entry(&mut list, None).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_whitespace_title_counts_as_blank() {
        let mut list = vec![achievement("A"), achievement("   ")];
        assert!(append_entry(&mut list, None).is_none());
        assert_eq!(list.len(), 2);

        let credentials = Credentials {
            achievements: list,
            ..Default::default()
        };
        assert_eq!(credentials.without_blanks().achievements.len(), 1);
    }

    #[test]
    fn test_append_to_empty_lists() {
        let mut credentials = Credentials::default();
        assert!(credentials.append(CredentialList::Achievements, None).is_some());
        assert!(credentials.append(CredentialList::Affiliations, None).is_some());
        assert!(credentials
            .append(CredentialList::SeminarsAttended, None)
            .is_some());
        assert_eq!(credentials.achievements.len(), 1);
        assert_eq!(credentials.affiliations.len(), 1);
        assert_eq!(credentials.seminars_attended.len(), 1);
    }

    #[test]
    fn test_fresh_affiliation_and_seminar_block_second_append() {
        let mut credentials = Credentials::default();
        credentials.append(CredentialList::Affiliations, None);
        credentials.append(CredentialList::SeminarsAttended, None);

        assert!(credentials.append(CredentialList::Affiliations, None).is_none());
        assert!(credentials
            .append(CredentialList::SeminarsAttended, None)
            .is_none());
        assert_eq!(credentials.affiliations.len(), 1);
        assert_eq!(credentials.seminars_attended.len(), 1);
    }

    #[test]
    fn test_affiliation_with_only_start_date_is_not_blank() {
        let mut credentials = Credentials::default();
        let id = credentials
            .append(CredentialList::Affiliations, None)
            .unwrap();
        credentials.edit(id, CredentialChange::AffiliationStartDate(date(2020)));

        assert!(credentials.append(CredentialList::Affiliations, None).is_some());
        assert_eq!(credentials.affiliations.len(), 2);
    }

    #[test]
    fn test_append_ids_are_unique() {
        let mut list: Vec<Achievement> = Vec::new();
        let mut ids = HashSet::new();
        for _ in 0..20 {
            let id = append_entry(&mut list, None).unwrap();
            let title: String = Word().fake();
            edit_entry(&mut list, id, |a| a.title = format!("{}-x", title));
            ids.insert(id);
        }
        assert_eq!(ids.len(), 20);
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn test_append_preferred_id_collision_falls_back() {
        let existing = achievement("A");
        let existing_id = existing.id;
        let mut list = vec![existing];

        let id = append_entry(&mut list, Some(existing_id)).unwrap();
        assert_ne!(id, existing_id);

        let wanted = Uuid::new_v4();
        edit_entry(&mut list, id, |a| a.title = "B".to_string());
        assert_eq!(append_entry(&mut list, Some(wanted)), Some(wanted));
    }

    #[test]
    fn test_edit_changes_only_target_field() {
        let mut credentials = Credentials::default();
        let first = credentials
            .append(CredentialList::Affiliations, None)
            .unwrap();
        credentials.edit(
            first,
            CredentialChange::AffiliationOrganizationName("Student Council".to_string()),
        );
        let second = credentials
            .append(CredentialList::Affiliations, None)
            .unwrap();
        let before = credentials.clone();

        assert!(credentials.edit(
            second,
            CredentialChange::AffiliationPosition("Treasurer".to_string())
        ));

        assert_eq!(credentials.affiliations[0], before.affiliations[0]);
        let edited = &credentials.affiliations[1];
        assert_eq!(edited.position, "Treasurer");
        assert_eq!(edited.organization_name, "");
        assert_eq!(edited.start_date, None);
        assert_eq!(edited.id, second);
        assert_eq!(credentials.achievements, before.achievements);
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let mut credentials = Credentials {
            achievements: vec![achievement("A")],
            ..Default::default()
        };
        let before = credentials.clone();
        assert!(!credentials.edit(
            Uuid::new_v4(),
            CredentialChange::AchievementTitle("B".to_string())
        ));
        assert_eq!(credentials, before);
    }

    #[test]
    fn test_edit_targets_list_of_change() {
        let shared = Uuid::new_v4();
        let mut credentials = Credentials {
            achievements: vec![Achievement {
                id: shared,
                title: "A".to_string(),
            }],
            seminars_attended: vec![Seminar {
                id: shared,
                name: "S".to_string(),
                start_date: None,
                end_date: None,
            }],
            ..Default::default()
        };
        credentials.edit(shared, CredentialChange::SeminarName("T".to_string()));
        assert_eq!(credentials.achievements[0].title, "A");
        assert_eq!(credentials.seminars_attended[0].name, "T");
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut list: Vec<Achievement> = (0..5)
            .map(|_| achievement(&Word().fake::<String>()))
            .collect();
        let ids: Vec<Uuid> = list.iter().map(|a| a.id).collect();

        assert!(remove_entry(&mut list, ids[2]));

        assert_eq!(list.len(), 4);
        let remaining: Vec<Uuid> = list.iter().map(|a| a.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[1], ids[3], ids[4]]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut credentials = Credentials {
            achievements: vec![achievement("A")],
            ..Default::default()
        };
        assert!(!credentials.remove(CredentialList::Achievements, Uuid::new_v4()));
        assert_eq!(credentials.achievements.len(), 1);
    }

    #[test]
    fn test_apply_replays_append_then_edit() {
        let mut credentials = Credentials::default();
        let id = Uuid::new_v4();
        let edits = vec![
            CredentialEdit::Append {
                list: CredentialList::SeminarsAttended,
                id: Some(id),
            },
            CredentialEdit::Edit {
                id,
                change: CredentialChange::SeminarName("Leadership 101".to_string()),
            },
            CredentialEdit::Edit {
                id,
                change: CredentialChange::SeminarStartDate(date(2021)),
            },
        ];
        for edit in edits {
            credentials.apply(edit);
        }

        assert_eq!(credentials.seminars_attended.len(), 1);
        assert_eq!(credentials.seminars_attended[0].name, "Leadership 101");
        assert_eq!(credentials.seminars_attended[0].start_date, date(2021));
    }

    #[test]
    fn test_edit_wire_format() {
        let edit: CredentialEdit = serde_json::from_value(serde_json::json!({
            "op": "edit",
            "id": "6f1c1f9e-2f0b-4c3e-9a57-0d7c1c2f4b11",
            "change": { "field": "affiliationStartDate", "value": "2019-06-01" }
        }))
        .unwrap();
        assert!(matches!(
            edit,
            CredentialEdit::Edit {
                change: CredentialChange::AffiliationStartDate(Some(_)),
                ..
            }
        ));
    }

    #[test]
    fn test_without_blanks_drops_default_entries() {
        let mut credentials = Credentials {
            achievements: vec![achievement("A")],
            ..Default::default()
        };
        credentials.append(CredentialList::Achievements, None);
        credentials.append(CredentialList::Affiliations, None);

        let stored = credentials.without_blanks();
        assert_eq!(stored.achievements.len(), 1);
        assert!(stored.affiliations.is_empty());
    }

    #[test]
    fn test_validate_date_ranges() {
        let mut credentials = Credentials::default();
        let id = credentials
            .append(CredentialList::Affiliations, None)
            .unwrap();
        credentials.edit(id, CredentialChange::AffiliationEndDate(date(2020)));
        assert!(credentials.validate().is_err());

        credentials.edit(id, CredentialChange::AffiliationStartDate(date(2021)));
        assert!(credentials.validate().is_err());

        credentials.edit(id, CredentialChange::AffiliationStartDate(date(2019)));
        assert!(credentials.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let entry = achievement("A");
        let credentials = Credentials {
            achievements: vec![entry.clone(), entry],
            ..Default::default()
        };
        let err = credentials.validate().unwrap_err();
        assert!(
            matches!(err, AppError::FieldValidation { ref field, .. } if field == "credentials.achievements")
        );
    }

    #[test]
    fn test_document_wire_format() {
        let credentials: Credentials = serde_json::from_value(serde_json::json!({
            "achievements": [{ "id": "6f1c1f9e-2f0b-4c3e-9a57-0d7c1c2f4b11", "title": "Dean's lister" }]
        }))
        .unwrap();
        assert_eq!(credentials.achievements.len(), 1);
        assert!(credentials.seminars_attended.is_empty());

        let json = serde_json::to_value(&credentials).unwrap();
        assert!(json.get("seminarsAttended").is_some());
    }
}
