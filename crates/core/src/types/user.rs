//! Portal user record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, UserId};

/// A signed-in (or previously signed-in) portal user.
///
/// Serialized camelCase, the shape kept both in the visitor session and in
/// the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl User {
    /// A fresh, non-admin user first seen at `now`.
    #[must_use]
    pub fn new(id: UserId, email: Email, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name: name.into(),
            is_admin: false,
            created_at: now,
            last_login: now,
        }
    }

    /// Upper-cased first letter of the display name, for avatars.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}
