//! Session lifecycle bound to persistent key-value storage.
//!
//! The active user is held in memory and mirrored, in full, to a single
//! storage record on every mutation (last write wins). Logging out only
//! forgets the in-memory session; the stored record stays so that the next
//! login with the same phone number restores the profile.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::instrument;

use farm_connect_core::{PhoneNumber, UserId};

use crate::models::{User, UserUpdate};
use crate::storage::{KeyValueStorage, StorageError};

/// Storage keys.
pub mod keys {
    /// Key for the persisted session user.
    pub const CURRENT_USER: &str = "farmConnectUser";
}

/// Errors from session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The storage backend rejected the write.
    #[error("could not save session: {0}")]
    Storage(#[from] StorageError),

    /// The user record could not be serialized.
    #[error("could not serialize session: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The active user session.
pub struct SessionStore<S> {
    storage: S,
    current: RwLock<Option<User>>,
}

impl<S: KeyValueStorage> SessionStore<S> {
    /// Create a session store with no active user.
    ///
    /// Call [`Self::load`] to restore a persisted session.
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Restore the persisted session, making it active.
    ///
    /// Returns `None` when nothing is stored or the record cannot be read;
    /// failures are logged and never surface to the caller.
    #[instrument(skip(self))]
    pub fn load(&self) -> Option<User> {
        let user = self.stored_user()?;
        *self.write_current() = Some(user.clone());
        tracing::debug!(user_id = %user.id, "Session restored");
        Some(user)
    }

    /// Read the persisted user without activating it.
    pub fn stored_user(&self) -> Option<User> {
        let json = match self.storage.get(keys::CURRENT_USER) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored session");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!(error = %e, "Stored session is corrupt, ignoring it");
                None
            }
        }
    }

    /// Log in with a verified phone number.
    ///
    /// Reuses the stored user when it belongs to `phone`, otherwise starts a
    /// new unregistered user. The result becomes the active session even if
    /// persisting it fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session could not be saved.
    #[instrument(skip(self), fields(phone = %phone))]
    pub fn login(&self, phone: &PhoneNumber) -> Result<User, SessionError> {
        let user = match self.stored_user() {
            Some(stored) if stored.phone_number == *phone => stored,
            _ => User::new(UserId::for_phone(phone), phone.clone()),
        };

        *self.write_current() = Some(user.clone());

        if let Err(e) = self.persist(&user) {
            tracing::error!(error = %e, user_id = %user.id, "Failed to save session during login");
            return Err(e);
        }

        tracing::info!(user_id = %user.id, registered = user.is_registered(), "User logged in");
        Ok(user)
    }

    /// Forget the active session. The stored record is kept.
    pub fn logout(&self) {
        if let Some(user) = self.write_current().take() {
            tracing::info!(user_id = %user.id, "User logged out");
        }
    }

    /// Merge `update` into the active user and persist the result.
    ///
    /// Returns `Ok(None)` without an active session. The merged user stays
    /// active even if persisting it fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the updated session could not be saved.
    #[instrument(skip(self, update))]
    pub fn update_user(&self, update: UserUpdate) -> Result<Option<User>, SessionError> {
        let updated = {
            let mut current = self.write_current();
            let Some(user) = current.as_mut() else {
                return Ok(None);
            };
            update.apply_to(user);
            user.clone()
        };

        if let Err(e) = self.persist(&updated) {
            tracing::error!(error = %e, user_id = %updated.id, "Failed to save updated user");
            return Err(e);
        }

        Ok(Some(updated))
    }

    /// The active user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.read_current().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_current().is_some()
    }

    fn persist(&self, user: &User) -> Result<(), SessionError> {
        let json = serde_json::to_string(user)?;
        self.storage.set(keys::CURRENT_USER, &json)?;
        Ok(())
    }

    fn read_current(&self) -> RwLockReadGuard<'_, Option<User>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_current(&self) -> RwLockWriteGuard<'_, Option<User>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> std::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let user_id = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|user| user.id.clone());
        f.debug_struct("SessionStore")
            .field("user_id", &user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::FieldUpdate;
    use crate::storage::MemoryStorage;
    use farm_connect_core::UserRole;

    fn phone(s: &str) -> PhoneNumber {
        PhoneNumber::parse(s).unwrap()
    }

    #[test]
    fn test_load_without_record() {
        let session = SessionStore::new(MemoryStorage::new());
        assert!(session.load().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_load_corrupt_record_is_no_session() {
        let storage = MemoryStorage::new();
        storage.set(keys::CURRENT_USER, "{not json").unwrap();
        let session = SessionStore::new(storage);
        assert!(session.load().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_load_unavailable_storage_is_no_session() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        let session = SessionStore::new(storage);
        assert!(session.load().is_none());
    }

    #[test]
    fn test_login_creates_unregistered_user() {
        let session = SessionStore::new(MemoryStorage::new());
        let user = session.login(&phone("9876543210")).unwrap();

        assert_eq!(user.phone_number.as_str(), "9876543210");
        assert_eq!(user.role, None);
        assert!(user.id.as_str().starts_with("user_9876543210_"));
        assert!(session.is_authenticated());

        let stored = session.storage().get(keys::CURRENT_USER).unwrap().unwrap();
        assert!(stored.contains(r#""phoneNumber":"9876543210""#));
    }

    #[test]
    fn test_login_is_idempotent_by_phone() {
        let session = SessionStore::new(MemoryStorage::new());
        let first = session.login(&phone("9876543210")).unwrap();
        session.logout();
        let second = session.login(&phone("9876543210")).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_login_with_other_phone_replaces_record() {
        let session = SessionStore::new(MemoryStorage::new());
        let first = session.login(&phone("9876543210")).unwrap();
        let second = session.login(&phone("9123456789")).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(session.stored_user().unwrap().id, second.id);
    }

    #[test]
    fn test_login_write_failure_still_activates_session() {
        let session = SessionStore::new(MemoryStorage::with_quota(8));
        let err = session.login(&phone("9876543210")).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert!(session.is_authenticated());
        assert!(session.stored_user().is_none());
    }

    #[test]
    fn test_logout_keeps_stored_record() {
        let session = SessionStore::new(MemoryStorage::new());
        let user = session.login(&phone("9876543210")).unwrap();
        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(session.stored_user().unwrap().id, user.id);
        assert_eq!(session.load().unwrap().id, user.id);
    }

    #[test]
    fn test_update_without_session_is_noop() {
        let session = SessionStore::new(MemoryStorage::new());
        let result = session
            .update_user(UserUpdate {
                first_name: FieldUpdate::Set("Asha".into()),
                ..UserUpdate::default()
            })
            .unwrap();
        assert!(result.is_none());
        assert!(session.storage().is_empty());
    }

    #[test]
    fn test_update_merges_and_persists() {
        let session = SessionStore::new(MemoryStorage::new());
        let user = session.login(&phone("9876543210")).unwrap();

        session
            .update_user(UserUpdate {
                first_name: FieldUpdate::Set("Asha".into()),
                ..UserUpdate::default()
            })
            .unwrap();
        let updated = session
            .update_user(UserUpdate {
                role: FieldUpdate::Set(UserRole::Buyer),
                ..UserUpdate::default()
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.first_name.as_deref(), Some("Asha"));
        assert_eq!(updated.role, Some(UserRole::Buyer));
        assert_eq!(session.stored_user().unwrap(), updated);
    }

    #[test]
    fn test_update_write_failure_keeps_merged_user() {
        let session = SessionStore::new(MemoryStorage::new());
        session.login(&phone("9876543210")).unwrap();
        session.storage().set_unavailable(true);

        let result = session.update_user(UserUpdate {
            first_name: FieldUpdate::Set("Asha".into()),
            ..UserUpdate::default()
        });

        assert!(result.is_err());
        assert_eq!(
            session.current_user().unwrap().first_name.as_deref(),
            Some("Asha")
        );
    }
}
