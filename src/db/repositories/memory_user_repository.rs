use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, User};
use crate::db::store::UserStore;

/// `UserStore` en mémoire (`STORAGE_BACKEND=memory`), utilisé aussi par les tests.
/// Les données sont perdues à l'arrêt du processus.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, User>>, RepositoryError> {
        self.users
            .read()
            .map_err(|_| RepositoryError::PoolError("user store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, User>>, RepositoryError> {
        self.users
            .write()
            .map_err(|_| RepositoryError::PoolError("user store lock poisoned".to_string()))
    }
}

impl UserStore for InMemoryUserRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, RepositoryError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }

        Ok(self
            .read()?
            .values()
            .find(|user| {
                username == Some(user.username.as_str()) || email == Some(user.email.as_str())
            })
            .cloned())
    }

    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.write()?;

        if users.values().any(|u| u.username == new_user.username) {
            return Err(RepositoryError::UniqueViolation(
                "users_username_key".to_string(),
            ));
        }
        if users.values().any(|u| u.email == new_user.email) {
            return Err(RepositoryError::UniqueViolation("users_email_key".to_string()));
        }

        let user = User::from_new(new_user);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<bool, RepositoryError> {
        let mut users = self.write()?;

        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };
        user.refresh_token = token.map(str::to_owned);
        user.updated_at = Utc::now();
        Ok(true)
    }

    fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, RepositoryError> {
        let mut users = self.write()?;

        match users.get_mut(&id) {
            Some(user) if user.refresh_token.as_deref() == Some(current) => {
                user.refresh_token = Some(next.to_owned());
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            avatar: "https://media.example/avatar.png".to_string(),
            cover_image: None,
            password_hash: "hash".to_string(),
        }
    }

    #[test]
    fn create_rejects_duplicate_username_and_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(&new_user("alice", "alice@example.com")).unwrap();

        let same_username = repo.create(&new_user("alice", "other@example.com"));
        assert!(matches!(same_username, Err(RepositoryError::UniqueViolation(_))));

        let same_email = repo.create(&new_user("bob", "alice@example.com"));
        assert!(matches!(same_email, Err(RepositoryError::UniqueViolation(_))));
    }

    #[test]
    fn find_by_username_or_email_matches_either_field() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&new_user("alice", "alice@example.com")).unwrap();

        let found = repo
            .find_by_username_or_email(Some("nobody"), Some("alice@example.com"))
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        let found = repo.find_by_username_or_email(Some("alice"), None).unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        assert!(repo.find_by_username_or_email(None, None).unwrap().is_none());
    }

    #[test]
    fn set_refresh_token_reports_missing_user() {
        let repo = InMemoryUserRepository::new();
        assert!(!repo.set_refresh_token(Uuid::new_v4(), Some("token")).unwrap());
    }

    #[test]
    fn swap_refresh_token_requires_current_value() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(&new_user("alice", "alice@example.com")).unwrap();

        // Aucun token stocké: le swap échoue
        assert!(!repo.swap_refresh_token(user.id, "a", "b").unwrap());

        repo.set_refresh_token(user.id, Some("a")).unwrap();
        assert!(repo.swap_refresh_token(user.id, "a", "b").unwrap());
        assert!(!repo.swap_refresh_token(user.id, "a", "c").unwrap());

        let stored = repo.find_by_id(user.id).unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("b"));
    }
}
