//! User directory: every account that has signed in or registered.

use chrono::Utc;
use solar_portal_core::{Email, User, UserId};
use tracing::instrument;

use crate::storage::{Datastore, Storage, StorageError, allocate_id, keys, load, save};

/// Repository over the `users` record.
pub struct UserDirectory<'a> {
    store: &'a Datastore,
}

impl<'a> UserDirectory<'a> {
    #[must_use]
    pub const fn new(store: &'a Datastore) -> Self {
        Self { store }
    }

    /// All users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn list(&self) -> Result<Vec<User>, StorageError> {
        Ok(load(self.store.backend(), keys::USERS)
            .await?
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.list().await?.len())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }

    /// Case-insensitive lookup.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.email.matches(email)))
    }

    /// Record a sign-in.
    ///
    /// A first sign-in creates the account, named after the email's local
    /// part. `grant_admin` only ever raises the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn upsert_login(&self, email: &Email, grant_admin: bool) -> Result<User, StorageError> {
        let _guard = self.store.lock().await;
        let mut users: Vec<User> = load(self.store.backend(), keys::USERS)
            .await?
            .unwrap_or_default();
        let now = Utc::now();

        let user = if let Some(existing) = users.iter_mut().find(|u| u.email.matches(email.as_str())) {
            existing.last_login = now;
            existing.is_admin |= grant_admin;
            existing.clone()
        } else {
            let id = next_id(self.store.backend(), &users).await?;
            let mut user = User::new(id, email.clone(), email.local_part(), now);
            user.is_admin = grant_admin;
            users.push(user.clone());
            tracing::info!(user_id = %user.id, "New user signed in");
            user
        };

        save(self.store.backend(), keys::USERS, &users).await?;
        Ok(user)
    }

    /// Record a registration.
    ///
    /// Registering an email that is already known renames the account and
    /// refreshes its sign-in time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self, name), fields(email = %email))]
    pub async fn create(&self, email: &Email, name: &str) -> Result<User, StorageError> {
        let _guard = self.store.lock().await;
        let mut users: Vec<User> = load(self.store.backend(), keys::USERS)
            .await?
            .unwrap_or_default();
        let now = Utc::now();

        let user = if let Some(existing) = users.iter_mut().find(|u| u.email.matches(email.as_str())) {
            name.clone_into(&mut existing.name);
            existing.last_login = now;
            existing.clone()
        } else {
            let id = next_id(self.store.backend(), &users).await?;
            let user = User::new(id, email.clone(), name, now);
            users.push(user.clone());
            tracing::info!(user_id = %user.id, "User registered");
            user
        };

        save(self.store.backend(), keys::USERS, &users).await?;
        Ok(user)
    }

    /// Flip a user's admin flag. Returns the new flag, `None` if the user
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self))]
    pub async fn toggle_admin(&self, id: UserId) -> Result<Option<bool>, StorageError> {
        let _guard = self.store.lock().await;
        let mut users: Vec<User> = load(self.store.backend(), keys::USERS)
            .await?
            .unwrap_or_default();

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.is_admin = !user.is_admin;
        let is_admin = user.is_admin;

        save(self.store.backend(), keys::USERS, &users).await?;
        tracing::info!(user_id = %id, is_admin, "Admin flag toggled");
        Ok(Some(is_admin))
    }

    /// Set the admin flag by email. Returns `false` if no such user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self))]
    pub async fn set_admin(&self, email: &str, is_admin: bool) -> Result<bool, StorageError> {
        let _guard = self.store.lock().await;
        let mut users: Vec<User> = load(self.store.backend(), keys::USERS)
            .await?
            .unwrap_or_default();

        let Some(user) = users.iter_mut().find(|u| u.email.matches(email)) else {
            return Ok(false);
        };
        user.is_admin = is_admin;

        save(self.store.backend(), keys::USERS, &users).await?;
        Ok(true)
    }

    /// Remove a user and their enrollment records. Returns `false` if the
    /// user did not exist.
    ///
    /// Seats are not released here; see `EnrollmentLedger::withdraw_all`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<bool, StorageError> {
        let _guard = self.store.lock().await;
        let mut users: Vec<User> = load(self.store.backend(), keys::USERS)
            .await?
            .unwrap_or_default();

        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }

        save(self.store.backend(), keys::USERS, &users).await?;
        self.store
            .backend()
            .remove_value(&keys::enrollments(id))
            .await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(true)
    }
}

/// A user id no account has held before.
async fn next_id(storage: &dyn Storage, users: &[User]) -> Result<UserId, StorageError> {
    let highest = users.iter().map(|u| u.id.as_i64()).max();
    Ok(UserId::new(
        allocate_id(storage, keys::NEXT_USER_ID, highest).await?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_first_login_creates_user_named_after_local_part() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);

        let user = directory
            .upsert_login(&email("jean.pierre@example.com"), false)
            .await
            .unwrap();

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.name, "jean.pierre");
        assert!(!user.is_admin);
        assert_eq!(directory.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeat_login_keeps_identity_and_admin_flag() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);

        let first = directory
            .upsert_login(&email("marie@example.com"), true)
            .await
            .unwrap();
        let second = directory
            .upsert_login(&email("MARIE@example.com"), false)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.is_admin);
        assert_eq!(directory.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);

        let a = directory.create(&email("a@example.com"), "Alice").await.unwrap();
        let b = directory.create(&email("b@example.com"), "Bruno").await.unwrap();

        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
        assert_eq!(b.name, "Bruno");
    }

    #[tokio::test]
    async fn test_deleted_user_id_is_not_reused() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);
        directory.create(&email("a@example.com"), "Alice").await.unwrap();
        let ghost = directory.create(&email("g@example.com"), "Gaëlle").await.unwrap();

        assert!(directory.delete(ghost.id).await.unwrap());
        let newcomer = directory
            .upsert_login(&email("n@example.com"), false)
            .await
            .unwrap();

        assert_ne!(newcomer.id, ghost.id);
        assert_eq!(newcomer.id, UserId::new(3));
    }

    #[tokio::test]
    async fn test_toggle_admin() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);
        let user = directory.create(&email("a@example.com"), "Alice").await.unwrap();

        assert_eq!(directory.toggle_admin(user.id).await.unwrap(), Some(true));
        assert_eq!(directory.toggle_admin(user.id).await.unwrap(), Some(false));
        assert_eq!(directory.toggle_admin(UserId::new(99)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_admin_by_email() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);
        directory.create(&email("a@example.com"), "Alice").await.unwrap();

        assert!(directory.set_admin("A@example.com", true).await.unwrap());
        assert!(directory.find_by_email("a@example.com").await.unwrap().unwrap().is_admin);
        assert!(!directory.set_admin("nobody@example.com", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_user_and_enrollments() {
        let store = Datastore::memory();
        let directory = UserDirectory::new(&store);
        let user = directory.create(&email("a@example.com"), "Alice").await.unwrap();
        save(store.backend(), &keys::enrollments(user.id), &Vec::<u8>::new())
            .await
            .unwrap();

        assert!(directory.delete(user.id).await.unwrap());
        assert!(directory.get(user.id).await.unwrap().is_none());
        assert!(store
            .backend()
            .get_value(&keys::enrollments(user.id))
            .await
            .unwrap()
            .is_none());
        assert!(!directory.delete(user.id).await.unwrap());
    }
}
