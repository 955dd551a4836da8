//! Formation catalogue and per-user enrollments.
//!
//! The catalogue lives under `formations_data`. When that record is absent
//! or undecodable it is re-seeded with the three default formations.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use solar_portal_core::{
    Enrollment, EnrollmentError, Formation, FormationDraft, FormationId, FormationLevel,
    FormationPatch, FormationValidationError, Price, User, UserId,
};
use thiserror::Error;
use tracing::instrument;

use crate::storage::{Datastore, Storage, StorageError, allocate_id, keys, load, save};

const HEADQUARTERS: &str = "Ouanaminthe, Siège AD Innovation";

/// Errors that can occur during formation operations.
#[derive(Debug, Error)]
pub enum FormationError {
    #[error("formation {0} not found")]
    NotFound(FormationId),

    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),

    #[error("invalid formation: {0}")]
    Invalid(#[from] FormationValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

struct Seed {
    id: i64,
    title: &'static str,
    description: &'static str,
    date: (i32, u32, u32),
    time: (u32, u32),
    duration: &'static str,
    instructor: &'static str,
    capacity: u32,
    enrolled: u32,
    level: FormationLevel,
    category: &'static str,
    price: i64,
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: 1,
        title: "Installation Panneau Solaire - Débutant",
        description: "Apprenez les bases de l'installation de panneaux solaires. Cette formation couvre les principes fondamentaux, la sécurité et les techniques d'installation.",
        date: (2026, 2, 15),
        time: (9, 0),
        duration: "3 heures",
        instructor: "Jean Pierre (Ingénieur)",
        capacity: 20,
        enrolled: 12,
        level: FormationLevel::Beginner,
        category: "Installation",
        price: 50,
    },
    Seed {
        id: 2,
        title: "Maintenance Système Solaire",
        description: "Formation sur la maintenance préventive et corrective des systèmes solaires.",
        date: (2026, 2, 22),
        time: (10, 0),
        duration: "2.5 heures",
        instructor: "Louis Emmanuel (Technicien)",
        capacity: 15,
        enrolled: 8,
        level: FormationLevel::Intermediate,
        category: "Maintenance",
        price: 40,
    },
    Seed {
        id: 3,
        title: "Audit Énergétique Avancé",
        description: "Formation avancée sur l'audit énergétique et l'optimisation des systèmes.",
        date: (2026, 3, 1),
        time: (14, 0),
        duration: "4 heures",
        instructor: "Marie Claire (Gestion de Projet)",
        capacity: 12,
        enrolled: 11,
        level: FormationLevel::Advanced,
        category: "Audit",
        price: 75,
    },
];

impl Seed {
    fn build(&self, created_at: DateTime<Utc>) -> Option<Formation> {
        let (year, month, day) = self.date;
        let (hour, minute) = self.time;
        Some(Formation {
            id: FormationId::new(self.id),
            title: self.title.to_owned(),
            description: self.description.to_owned(),
            date: NaiveDate::from_ymd_opt(year, month, day)?,
            time: NaiveTime::from_hms_opt(hour, minute, 0)?,
            duration: self.duration.to_owned(),
            location: HEADQUARTERS.to_owned(),
            instructor: self.instructor.to_owned(),
            capacity: self.capacity,
            enrolled: self.enrolled,
            level: self.level,
            category: self.category.to_owned(),
            price: Price::usd(Decimal::from(self.price)),
            image: None,
            created_at,
        })
    }
}

/// The catalogue a fresh installation starts with.
#[must_use]
pub fn default_formations(created_at: DateTime<Utc>) -> Vec<Formation> {
    SEEDS.iter().filter_map(|seed| seed.build(created_at)).collect()
}

/// Load the catalogue, seeding it when absent or undecodable.
///
/// Callers hold the datastore lock.
async fn load_or_seed(storage: &dyn Storage) -> Result<Vec<Formation>, StorageError> {
    if let Some(formations) = load(storage, keys::FORMATIONS).await? {
        return Ok(formations);
    }

    let formations = default_formations(Utc::now());
    save(storage, keys::FORMATIONS, &formations).await?;
    tracing::info!(count = formations.len(), "Seeded default formations");
    Ok(formations)
}

/// Rewrite every directory user's enrollment records, keeping only those
/// `keep` accepts. Seat counts are left alone.
///
/// Callers hold the datastore lock.
async fn prune_ledgers(
    storage: &dyn Storage,
    keep: impl Fn(&Enrollment) -> bool,
) -> Result<usize, StorageError> {
    let users: Vec<User> = load(storage, keys::USERS).await?.unwrap_or_default();
    let mut pruned = 0;

    for user in &users {
        let key = keys::enrollments(user.id);
        let Some(mut records) = load::<Vec<Enrollment>>(storage, &key).await? else {
            continue;
        };
        let before = records.len();
        records.retain(&keep);
        if records.len() != before {
            pruned += before - records.len();
            save(storage, &key, &records).await?;
        }
    }

    Ok(pruned)
}

/// Repository over the `formations_data` record.
pub struct FormationRepository<'a> {
    store: &'a Datastore,
}

impl<'a> FormationRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a Datastore) -> Self {
        Self { store }
    }

    /// All formations in catalogue order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn list(&self) -> Result<Vec<Formation>, StorageError> {
        let _guard = self.store.lock().await;
        load_or_seed(self.store.backend()).await
    }

    /// Formations matching both filters; `None` matches everything.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn list_filtered(
        &self,
        level: Option<FormationLevel>,
        category: Option<&str>,
    ) -> Result<Vec<Formation>, StorageError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|f| level.is_none_or(|level| f.level == level))
            .filter(|f| category.is_none_or(|category| f.category == category))
            .collect())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn get(&self, id: FormationId) -> Result<Option<Formation>, StorageError> {
        Ok(self.list().await?.into_iter().find(|f| f.id == id))
    }

    /// Add a formation under a fresh id. Ids of deleted formations are
    /// never handed out again.
    ///
    /// # Errors
    ///
    /// Returns `FormationError::Invalid` if the draft fails validation.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn add(&self, draft: FormationDraft) -> Result<Formation, FormationError> {
        let _guard = self.store.lock().await;
        let mut formations = load_or_seed(self.store.backend()).await?;

        // Seed ids stay reserved even after the seeded formations are deleted
        let highest = formations
            .iter()
            .map(|f| f.id.as_i64())
            .chain(SEEDS.iter().map(|seed| seed.id))
            .max();
        let id = FormationId::new(
            allocate_id(self.store.backend(), keys::NEXT_FORMATION_ID, highest).await?,
        );
        let formation = Formation::from_draft(id, draft, Utc::now())?;
        formations.push(formation.clone());

        save(self.store.backend(), keys::FORMATIONS, &formations).await?;
        tracing::info!(formation_id = %id, "Formation added");
        Ok(formation)
    }

    /// Apply a partial update. Returns `None` when the formation does not exist.
    ///
    /// # Errors
    ///
    /// Returns `FormationError::Invalid` if the patched formation fails validation.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: FormationId,
        patch: FormationPatch,
    ) -> Result<Option<Formation>, FormationError> {
        let _guard = self.store.lock().await;
        let mut formations = load_or_seed(self.store.backend()).await?;

        let Some(slot) = formations.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        let updated = slot.apply(patch)?;
        *slot = updated.clone();

        save(self.store.backend(), keys::FORMATIONS, &formations).await?;
        Ok(Some(updated))
    }

    /// Remove a formation and every enrollment record pointing at it.
    /// Returns `false` when the formation does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: FormationId) -> Result<bool, StorageError> {
        let _guard = self.store.lock().await;
        let mut formations = load_or_seed(self.store.backend()).await?;

        let before = formations.len();
        formations.retain(|f| f.id != id);
        if formations.len() == before {
            return Ok(false);
        }

        save(self.store.backend(), keys::FORMATIONS, &formations).await?;
        let pruned = prune_ledgers(self.store.backend(), |r| r.formation_id != id).await?;
        tracing::info!(formation_id = %id, pruned, "Formation deleted");
        Ok(true)
    }

    /// Take one seat.
    ///
    /// # Errors
    ///
    /// Returns `FormationError::NotFound`, or `Enrollment(Full)` with the
    /// catalogue unchanged.
    pub async fn enroll(&self, id: FormationId) -> Result<Formation, FormationError> {
        self.adjust(id, Formation::enroll).await
    }

    /// Release one seat.
    ///
    /// # Errors
    ///
    /// Returns `FormationError::NotFound`, or `Enrollment(Empty)` with the
    /// catalogue unchanged.
    pub async fn unenroll(&self, id: FormationId) -> Result<Formation, FormationError> {
        self.adjust(id, Formation::unenroll).await
    }

    async fn adjust(
        &self,
        id: FormationId,
        change: fn(&mut Formation) -> Result<(), EnrollmentError>,
    ) -> Result<Formation, FormationError> {
        let _guard = self.store.lock().await;
        let mut formations = load_or_seed(self.store.backend()).await?;

        let formation = formations
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(FormationError::NotFound(id))?;
        change(formation)?;
        let formation = formation.clone();

        save(self.store.backend(), keys::FORMATIONS, &formations).await?;
        Ok(formation)
    }

    /// Replace the catalogue with the default formations. Seat counts go
    /// back to their seeded values, so every enrollment record is dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self))]
    pub async fn reset_defaults(&self) -> Result<Vec<Formation>, StorageError> {
        let _guard = self.store.lock().await;
        let formations = default_formations(Utc::now());
        save(self.store.backend(), keys::FORMATIONS, &formations).await?;
        let pruned = prune_ledgers(self.store.backend(), |_| false).await?;
        tracing::info!(count = formations.len(), pruned, "Formations reset to defaults");
        Ok(formations)
    }
}

/// Outcome of [`EnrollmentLedger::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentChange {
    Enrolled(Formation),
    Unenrolled(Formation),
}

/// Per-user enrollment records, kept in step with seat counts.
pub struct EnrollmentLedger<'a> {
    store: &'a Datastore,
}

impl<'a> EnrollmentLedger<'a> {
    #[must_use]
    pub const fn new(store: &'a Datastore) -> Self {
        Self { store }
    }

    /// A user's enrollments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError> {
        Ok(load(self.store.backend(), &keys::enrollments(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Ids of the formations a user is enrolled in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn formation_ids(&self, user_id: UserId) -> Result<HashSet<FormationId>, StorageError> {
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .map(|e| e.formation_id)
            .collect())
    }

    /// Enroll the user, or withdraw them if already enrolled.
    ///
    /// # Errors
    ///
    /// Returns `FormationError::NotFound` for an unknown formation and
    /// `Enrollment(Full)` when no seat is left. Nothing is written on error.
    /// Withdrawing always drops the record, even when the count is already 0.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: UserId,
        formation_id: FormationId,
    ) -> Result<EnrollmentChange, FormationError> {
        let _guard = self.store.lock().await;
        let storage = self.store.backend();
        let key = keys::enrollments(user_id);

        let mut records: Vec<Enrollment> = load(storage, &key).await?.unwrap_or_default();
        let mut formations = load_or_seed(storage).await?;
        let formation = formations
            .iter_mut()
            .find(|f| f.id == formation_id)
            .ok_or(FormationError::NotFound(formation_id))?;

        let already_enrolled = records.iter().any(|r| r.formation_id == formation_id);
        let change = if already_enrolled {
            // The admin panel may have lowered the count below the ledger
            if formation.unenroll().is_err() {
                tracing::warn!(formation_id = %formation_id, "Withdrawal with no seat to release");
            }
            records.retain(|r| r.formation_id != formation_id);
            EnrollmentChange::Unenrolled(formation.clone())
        } else {
            formation.enroll()?;
            records.push(Enrollment {
                formation_id,
                enrolled_at: Utc::now(),
            });
            EnrollmentChange::Enrolled(formation.clone())
        };

        save(storage, keys::FORMATIONS, &formations).await?;
        save(storage, &key, &records).await?;
        tracing::info!(
            user_id = %user_id,
            formation_id = %formation_id,
            enrolled = matches!(change, EnrollmentChange::Enrolled(_)),
            "Enrollment toggled"
        );
        Ok(change)
    }

    /// Release every seat the user holds and drop their records. Returns
    /// the number of seats released.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self))]
    pub async fn withdraw_all(&self, user_id: UserId) -> Result<usize, StorageError> {
        let _guard = self.store.lock().await;
        let storage = self.store.backend();
        let key = keys::enrollments(user_id);

        let records: Vec<Enrollment> = load(storage, &key).await?.unwrap_or_default();
        if records.is_empty() {
            return Ok(0);
        }

        let mut formations = load_or_seed(storage).await?;
        let mut released = 0;
        for record in &records {
            if let Some(formation) = formations.iter_mut().find(|f| f.id == record.formation_id)
                && formation.unenroll().is_ok()
            {
                released += 1;
            }
        }

        save(storage, keys::FORMATIONS, &formations).await?;
        storage.remove_value(&key).await?;
        Ok(released)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use solar_portal_core::Email;

    use crate::services::users::UserDirectory;

    fn draft(title: &str, capacity: u32) -> FormationDraft {
        FormationDraft {
            title: title.to_owned(),
            description: "Pratique sur site".to_owned(),
            date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            duration: "1 jour".to_owned(),
            location: HEADQUARTERS.to_owned(),
            instructor: "Sophie Laurent".to_owned(),
            capacity,
            enrolled: 0,
            level: FormationLevel::Beginner,
            category: "Installation".to_owned(),
            price: Price::usd(25),
            image: None,
        }
    }

    #[test]
    fn test_default_formations() {
        let formations = default_formations(Utc::now());
        assert_eq!(formations.len(), 3);
        assert_eq!(formations[0].title, "Installation Panneau Solaire - Débutant");
        assert_eq!(formations[2].enrolled, 11);
        assert_eq!(formations[2].capacity, 12);
        assert!(formations.iter().all(|f| f.location == HEADQUARTERS));
    }

    #[tokio::test]
    async fn test_list_seeds_when_absent() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);

        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert!(store
            .backend()
            .get_value(keys::FORMATIONS)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_list_reseeds_when_corrupt() {
        let store = Datastore::memory();
        store
            .backend()
            .set_value(keys::FORMATIONS, json!("not a list"))
            .await
            .unwrap();

        let formations = FormationRepository::new(&store).list().await.unwrap();
        assert_eq!(formations.len(), 3);
    }

    #[tokio::test]
    async fn test_list_filtered() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);

        let advanced = repo
            .list_filtered(Some(FormationLevel::Advanced), None)
            .await
            .unwrap();
        assert_eq!(advanced.len(), 1);
        assert_eq!(advanced[0].category, "Audit");

        let none = repo
            .list_filtered(Some(FormationLevel::Advanced), Some("Maintenance"))
            .await
            .unwrap();
        assert!(none.is_empty());

        assert_eq!(repo.list_filtered(None, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_add_uses_next_id() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);

        let added = repo.add(draft("Câblage DC", 10)).await.unwrap();
        assert_eq!(added.id, FormationId::new(4));
        assert_eq!(repo.list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_deleted_id_is_not_reused() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);
        let ledger = EnrollmentLedger::new(&store);
        let user = UserDirectory::new(&store)
            .create(&Email::parse("ana@example.com").unwrap(), "Ana")
            .await
            .unwrap();
        let audit = FormationId::new(3);

        ledger.toggle(user.id, audit).await.unwrap();
        assert!(repo.delete(audit).await.unwrap());
        assert!(ledger.list(user.id).await.unwrap().is_empty());

        let added = repo
            .add(FormationDraft {
                enrolled: 5,
                ..draft("Câblage DC", 10)
            })
            .await
            .unwrap();
        assert_eq!(added.id, FormationId::new(4));
        assert!(!ledger.formation_ids(user.id).await.unwrap().contains(&added.id));

        let change = ledger.toggle(user.id, added.id).await.unwrap();
        assert!(matches!(change, EnrollmentChange::Enrolled(ref f) if f.enrolled == 6));
    }

    #[tokio::test]
    async fn test_delete_keeps_other_enrollments() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);
        let ledger = EnrollmentLedger::new(&store);
        let user = UserDirectory::new(&store)
            .create(&Email::parse("ana@example.com").unwrap(), "Ana")
            .await
            .unwrap();

        ledger.toggle(user.id, FormationId::new(1)).await.unwrap();
        ledger.toggle(user.id, FormationId::new(2)).await.unwrap();
        repo.delete(FormationId::new(2)).await.unwrap();

        let ids = ledger.formation_ids(user.id).await.unwrap();
        assert_eq!(ids, HashSet::from([FormationId::new(1)]));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_draft() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);

        let result = repo.add(draft("", 10)).await;
        assert!(matches!(result, Err(FormationError::Invalid(_))));
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);

        let updated = repo
            .update(
                FormationId::new(2),
                FormationPatch {
                    capacity: Some(30),
                    ..FormationPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.capacity, 30);
        assert!(repo
            .update(FormationId::new(42), FormationPatch::default())
            .await
            .unwrap()
            .is_none());

        assert!(repo.delete(FormationId::new(2)).await.unwrap());
        assert!(!repo.delete(FormationId::new(2)).await.unwrap());
        assert!(repo.get(FormationId::new(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enroll_until_full() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);

        let audit = repo.enroll(FormationId::new(3)).await.unwrap();
        assert_eq!(audit.enrolled, 12);

        let result = repo.enroll(FormationId::new(3)).await;
        assert!(matches!(
            result,
            Err(FormationError::Enrollment(EnrollmentError::Full))
        ));
        assert_eq!(repo.get(FormationId::new(3)).await.unwrap().unwrap().enrolled, 12);
    }

    #[tokio::test]
    async fn test_unenroll_empty_formation() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);
        let added = repo.add(draft("Câblage DC", 10)).await.unwrap();

        let result = repo.unenroll(added.id).await;
        assert!(matches!(
            result,
            Err(FormationError::Enrollment(EnrollmentError::Empty))
        ));
    }

    #[tokio::test]
    async fn test_reset_defaults() {
        let store = Datastore::memory();
        let repo = FormationRepository::new(&store);
        let ledger = EnrollmentLedger::new(&store);
        let user = UserDirectory::new(&store)
            .create(&Email::parse("ana@example.com").unwrap(), "Ana")
            .await
            .unwrap();
        repo.add(draft("Câblage DC", 10)).await.unwrap();
        ledger.toggle(user.id, FormationId::new(1)).await.unwrap();

        assert_eq!(repo.reset_defaults().await.unwrap().len(), 3);
        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert!(ledger.list(user.id).await.unwrap().is_empty());
        assert_eq!(repo.get(FormationId::new(1)).await.unwrap().unwrap().enrolled, 12);
    }

    #[tokio::test]
    async fn test_toggle_enrolls_then_withdraws() {
        let store = Datastore::memory();
        let ledger = EnrollmentLedger::new(&store);
        let repo = FormationRepository::new(&store);
        let user = UserId::new(1);
        let maintenance = FormationId::new(2);

        let change = ledger.toggle(user, maintenance).await.unwrap();
        assert!(matches!(change, EnrollmentChange::Enrolled(ref f) if f.enrolled == 9));
        assert!(ledger.formation_ids(user).await.unwrap().contains(&maintenance));

        let change = ledger.toggle(user, maintenance).await.unwrap();
        assert!(matches!(change, EnrollmentChange::Unenrolled(ref f) if f.enrolled == 8));
        assert!(ledger.list(user).await.unwrap().is_empty());
        assert_eq!(repo.get(maintenance).await.unwrap().unwrap().enrolled, 8);
    }

    #[tokio::test]
    async fn test_toggle_full_formation_writes_nothing() {
        let store = Datastore::memory();
        let ledger = EnrollmentLedger::new(&store);
        let audit = FormationId::new(3);

        ledger.toggle(UserId::new(1), audit).await.unwrap();
        let result = ledger.toggle(UserId::new(2), audit).await;

        assert!(matches!(
            result,
            Err(FormationError::Enrollment(EnrollmentError::Full))
        ));
        assert!(ledger.list(UserId::new(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_from_full_formation_is_allowed() {
        let store = Datastore::memory();
        let ledger = EnrollmentLedger::new(&store);
        let audit = FormationId::new(3);

        ledger.toggle(UserId::new(1), audit).await.unwrap();
        let change = ledger.toggle(UserId::new(1), audit).await.unwrap();
        assert!(matches!(change, EnrollmentChange::Unenrolled(ref f) if f.enrolled == 11));
    }

    #[tokio::test]
    async fn test_withdraw_when_count_already_zero() {
        let store = Datastore::memory();
        let ledger = EnrollmentLedger::new(&store);
        let repo = FormationRepository::new(&store);
        let user = UserId::new(1);
        let installation = FormationId::new(1);

        ledger.toggle(user, installation).await.unwrap();
        repo.update(
            installation,
            FormationPatch {
                enrolled: Some(0),
                ..FormationPatch::default()
            },
        )
        .await
        .unwrap();

        let change = ledger.toggle(user, installation).await.unwrap();
        assert!(matches!(change, EnrollmentChange::Unenrolled(ref f) if f.enrolled == 0));
        assert!(ledger.list(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_unknown_formation() {
        let store = Datastore::memory();
        let ledger = EnrollmentLedger::new(&store);

        let result = ledger.toggle(UserId::new(1), FormationId::new(99)).await;
        assert!(matches!(result, Err(FormationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_withdraw_all_releases_seats() {
        let store = Datastore::memory();
        let ledger = EnrollmentLedger::new(&store);
        let repo = FormationRepository::new(&store);
        let user = UserId::new(5);

        ledger.toggle(user, FormationId::new(1)).await.unwrap();
        ledger.toggle(user, FormationId::new(2)).await.unwrap();

        assert_eq!(ledger.withdraw_all(user).await.unwrap(), 2);
        assert!(ledger.list(user).await.unwrap().is_empty());
        assert_eq!(repo.get(FormationId::new(1)).await.unwrap().unwrap().enrolled, 12);
        assert_eq!(repo.get(FormationId::new(2)).await.unwrap().unwrap().enrolled, 8);
    }
}
