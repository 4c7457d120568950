use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, User};
use crate::db::schema::users;
use crate::db::store::UserStore;
use crate::db::{DbConnection, DbPool};

/// `UserStore` adossé à PostgreSQL via diesel.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<DbConnection, RepositoryError> {
        self.pool.get().map_err(RepositoryError::from)
    }
}

impl UserStore for PgUserRepository {
    /// Trouver un utilisateur par ID
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.connection()?;

        users::table
            .filter(users::id.eq(id))
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, RepositoryError> {
        let query = users::table.select(User::as_select()).into_boxed();

        let query = match (username, email) {
            (Some(username), Some(email)) => {
                query.filter(users::username.eq(username).or(users::email.eq(email)))
            }
            (Some(username), None) => query.filter(users::username.eq(username)),
            (None, Some(email)) => query.filter(users::email.eq(email)),
            (None, None) => return Ok(None),
        };

        let mut conn = self.connection()?;
        query.first(&mut conn).optional().map_err(Into::into)
    }

    /// Créer un nouvel utilisateur
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = self.connection()?;

        diesel::insert_into(users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<bool, RepositoryError> {
        let mut conn = self.connection()?;

        let updated = diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::refresh_token.eq(token),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }

    fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.connection()?;

        // La clause WHERE sur l'ancienne valeur rend la rotation atomique
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::refresh_token.eq(current)),
        )
        .set((
            users::refresh_token.eq(next),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{DEFAULT_POOL_SIZE, create_pool};

    fn repository() -> PgUserRepository {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PgUserRepository::new(create_pool(&database_url, DEFAULT_POOL_SIZE).expect("pool"))
    }

    fn new_user(suffix: &str) -> NewUser {
        let unique = Uuid::new_v4().simple().to_string();
        NewUser {
            username: format!("user_{suffix}_{unique}"),
            email: format!("{suffix}_{unique}@example.com"),
            full_name: "Test User".to_string(),
            avatar: "https://media.example/avatar.png".to_string(),
            cover_image: None,
            password_hash: "test_hash".to_string(),
        }
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    fn create_then_find_by_username_or_email() {
        let repo = repository();
        let new_user = new_user("find");
        let created = repo.create(&new_user).expect("Failed to create user");

        let by_username = repo
            .find_by_username_or_email(Some(&new_user.username), None)
            .expect("query")
            .expect("user should exist");
        assert_eq!(by_username.id, created.id);

        let by_email = repo
            .find_by_username_or_email(None, Some(&new_user.email))
            .expect("query")
            .expect("user should exist");
        assert_eq!(by_email.id, created.id);
        assert!(by_email.refresh_token.is_none());
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    fn create_duplicate_email_fails_with_unique_violation() {
        let repo = repository();
        let first = new_user("dup");
        repo.create(&first).expect("Failed to create first user");

        let second = NewUser {
            username: format!("{}_other", first.username),
            ..first.clone()
        };

        let result = repo.create(&second);
        assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    fn swap_refresh_token_only_succeeds_against_current_value() {
        let repo = repository();
        let created = repo.create(&new_user("swap")).expect("create");

        assert!(repo.set_refresh_token(created.id, Some("first")).unwrap());
        assert!(!repo.swap_refresh_token(created.id, "stale", "second").unwrap());
        assert!(repo.swap_refresh_token(created.id, "first", "second").unwrap());

        let stored = repo.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("second"));
    }
}
