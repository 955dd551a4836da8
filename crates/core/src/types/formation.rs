//! Training courses ("formations") and their seat arithmetic.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FormationId, Price};

/// Fixed category list offered in the formation filters.
pub const CATEGORIES: [&str; 3] = ["Installation", "Maintenance", "Audit"];

/// Difficulty level of a formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationLevel {
    #[serde(rename = "Débutant", alias = "debutant")]
    Beginner,
    #[serde(rename = "Intermédiaire", alias = "intermediaire")]
    Intermediate,
    #[serde(rename = "Avancé", alias = "avance")]
    Advanced,
}

impl FormationLevel {
    /// All levels, in ascending difficulty.
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Débutant",
            Self::Intermediate => "Intermédiaire",
            Self::Advanced => "Avancé",
        }
    }

    /// URL-safe identifier used in query strings and forms.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Beginner => "debutant",
            Self::Intermediate => "intermediaire",
            Self::Advanced => "avance",
        }
    }
}

impl std::fmt::Display for FormationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for FormationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.slug() == s || level.label() == s)
            .ok_or_else(|| format!("invalid formation level: {s}"))
    }
}

/// Seat arithmetic failures. The formation is left untouched.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentError {
    #[error("formation is full")]
    Full,
    #[error("formation has no enrolled participants")]
    Empty,
}

/// Invalid formation contents.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormationValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    #[error("enrolled ({enrolled}) exceeds capacity ({capacity})")]
    OverCapacity { enrolled: u32, capacity: u32 },
}

/// A scheduled training course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formation {
    pub id: FormationId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: String,
    pub location: String,
    pub instructor: String,
    pub capacity: u32,
    pub enrolled: u32,
    pub level: FormationLevel,
    pub category: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Formation {
    /// Build a formation from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure of the draft.
    pub fn from_draft(
        id: FormationId,
        draft: FormationDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FormationValidationError> {
        draft.validate()?;
        Ok(Self {
            id,
            title: draft.title.trim().to_owned(),
            description: draft.description,
            date: draft.date,
            time: draft.time,
            duration: draft.duration,
            location: draft.location,
            instructor: draft.instructor,
            capacity: draft.capacity,
            enrolled: draft.enrolled,
            level: draft.level,
            category: draft.category,
            price: draft.price,
            image: draft.image,
            created_at,
        })
    }

    /// Take one seat.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::Full` when every seat is taken.
    pub const fn enroll(&mut self) -> Result<(), EnrollmentError> {
        if self.enrolled >= self.capacity {
            return Err(EnrollmentError::Full);
        }
        self.enrolled += 1;
        Ok(())
    }

    /// Release one seat.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError::Empty` when nobody is enrolled.
    pub const fn unenroll(&mut self) -> Result<(), EnrollmentError> {
        if self.enrolled == 0 {
            return Err(EnrollmentError::Empty);
        }
        self.enrolled -= 1;
        Ok(())
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }

    #[must_use]
    pub const fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }

    /// Share of seats taken, 0 to 100.
    #[must_use]
    pub fn fill_percent(&self) -> u32 {
        if self.capacity == 0 {
            return 100;
        }
        let percent = u64::from(self.enrolled) * 100 / u64::from(self.capacity);
        u32::try_from(percent.min(100)).unwrap_or(100)
    }

    /// The same formation as an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> FormationDraft {
        FormationDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            time: self.time,
            duration: self.duration.clone(),
            location: self.location.clone(),
            instructor: self.instructor.clone(),
            capacity: self.capacity,
            enrolled: self.enrolled,
            level: self.level,
            category: self.category.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }

    /// Apply a partial update, keeping `id` and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the patched formation is inconsistent;
    /// `self` is left untouched in that case.
    pub fn apply(&self, patch: FormationPatch) -> Result<Self, FormationValidationError> {
        let mut draft = self.to_draft();
        if let Some(title) = patch.title {
            draft.title = title;
        }
        if let Some(description) = patch.description {
            draft.description = description;
        }
        if let Some(date) = patch.date {
            draft.date = date;
        }
        if let Some(time) = patch.time {
            draft.time = time;
        }
        if let Some(duration) = patch.duration {
            draft.duration = duration;
        }
        if let Some(location) = patch.location {
            draft.location = location;
        }
        if let Some(instructor) = patch.instructor {
            draft.instructor = instructor;
        }
        if let Some(capacity) = patch.capacity {
            draft.capacity = capacity;
        }
        if let Some(enrolled) = patch.enrolled {
            draft.enrolled = enrolled;
        }
        if let Some(level) = patch.level {
            draft.level = level;
        }
        if let Some(category) = patch.category {
            draft.category = category;
        }
        if let Some(price) = patch.price {
            draft.price = price;
        }
        if let Some(image) = patch.image {
            draft.image = image;
        }
        Self::from_draft(self.id, draft, self.created_at)
    }
}

/// A formation before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: String,
    pub location: String,
    pub instructor: String,
    pub capacity: u32,
    #[serde(default)]
    pub enrolled: u32,
    pub level: FormationLevel,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
}

impl FormationDraft {
    /// Check the invariants every stored formation holds.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), FormationValidationError> {
        if self.title.trim().is_empty() {
            return Err(FormationValidationError::EmptyTitle);
        }
        if self.capacity == 0 {
            return Err(FormationValidationError::ZeroCapacity);
        }
        if self.enrolled > self.capacity {
            return Err(FormationValidationError::OverCapacity {
                enrolled: self.enrolled,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Partial update; `None` leaves a field unchanged.
///
/// `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub capacity: Option<u32>,
    pub enrolled: Option<u32>,
    pub level: Option<FormationLevel>,
    pub category: Option<String>,
    pub price: Option<Price>,
    pub image: Option<Option<String>>,
}

/// A user's seat in a formation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub formation_id: FormationId,
    pub enrolled_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(capacity: u32, enrolled: u32) -> FormationDraft {
        FormationDraft {
            title: "Maintenance Système Solaire".to_owned(),
            description: "Maintenance préventive".to_owned(),
            date: NaiveDate::from_ymd_opt(2026, 2, 22).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration: "2.5 heures".to_owned(),
            location: "Ouanaminthe".to_owned(),
            instructor: "Louis Emmanuel".to_owned(),
            capacity,
            enrolled,
            level: FormationLevel::Intermediate,
            category: "Maintenance".to_owned(),
            price: Price::usd(40),
            image: None,
        }
    }

    fn formation(capacity: u32, enrolled: u32) -> Formation {
        Formation::from_draft(FormationId::new(1), draft(capacity, enrolled), Utc::now()).unwrap()
    }

    #[test]
    fn test_enroll_takes_exactly_one_seat() {
        let mut f = formation(15, 8);
        f.enroll().unwrap();
        assert_eq!(f.enrolled, 9);
        assert_eq!(f.seats_left(), 6);
    }

    #[test]
    fn test_enroll_full_is_rejected_without_change() {
        let mut f = formation(12, 12);
        assert_eq!(f.enroll(), Err(EnrollmentError::Full));
        assert_eq!(f.enrolled, 12);
        assert!(f.is_full());
    }

    #[test]
    fn test_unenroll_releases_exactly_one_seat() {
        let mut f = formation(12, 12);
        f.unenroll().unwrap();
        assert_eq!(f.enrolled, 11);
    }

    #[test]
    fn test_unenroll_empty_is_rejected_without_change() {
        let mut f = formation(5, 0);
        assert_eq!(f.unenroll(), Err(EnrollmentError::Empty));
        assert_eq!(f.enrolled, 0);
    }

    #[test]
    fn test_fill_percent() {
        assert_eq!(formation(20, 12).fill_percent(), 60);
        assert_eq!(formation(12, 12).fill_percent(), 100);
        assert_eq!(formation(3, 0).fill_percent(), 0);
    }

    #[test]
    fn test_draft_validation() {
        let mut d = draft(10, 2);
        d.title = "   ".to_owned();
        assert_eq!(d.validate(), Err(FormationValidationError::EmptyTitle));
        assert_eq!(
            draft(0, 0).validate(),
            Err(FormationValidationError::ZeroCapacity)
        );
        assert_eq!(
            draft(3, 4).validate(),
            Err(FormationValidationError::OverCapacity {
                enrolled: 4,
                capacity: 3
            })
        );
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let original = formation(15, 8);
        let patched = original
            .apply(FormationPatch {
                title: Some("Maintenance avancée".to_owned()),
                capacity: Some(20),
                image: Some(Some("/static/img/maintenance.jpg".to_owned())),
                ..FormationPatch::default()
            })
            .unwrap();
        assert_eq!(patched.id, original.id);
        assert_eq!(patched.created_at, original.created_at);
        assert_eq!(patched.title, "Maintenance avancée");
        assert_eq!(patched.capacity, 20);
        assert_eq!(patched.enrolled, 8);
        assert!(patched.image.is_some());
    }

    #[test]
    fn test_apply_patch_rejects_capacity_below_enrolled() {
        let original = formation(15, 8);
        let result = original.apply(FormationPatch {
            capacity: Some(5),
            ..FormationPatch::default()
        });
        assert!(matches!(
            result,
            Err(FormationValidationError::OverCapacity { .. })
        ));
    }

    #[test]
    fn test_level_labels_and_slugs() {
        assert_eq!(
            serde_json::to_string(&FormationLevel::Advanced).unwrap(),
            "\"Avancé\""
        );
        assert_eq!(
            "intermediaire".parse::<FormationLevel>().unwrap(),
            FormationLevel::Intermediate
        );
        assert_eq!(
            "Débutant".parse::<FormationLevel>().unwrap(),
            FormationLevel::Beginner
        );
        assert!("Tous".parse::<FormationLevel>().is_err());
    }
}
