use account_manager_api::UserResponse;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

use crate::db::schema::users;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Construit un enregistrement tel que la base le renverrait après insertion
    pub fn from_new(new_user: &NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            full_name: new_user.full_name.clone(),
            avatar: new_user.avatar.clone(),
            cover_image: new_user.cover_image.clone(),
            password_hash: new_user.password_hash.clone(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image.unwrap_or_default(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_hides_secrets_and_defaults_cover_image() {
        let mut user = User::from_new(&NewUser {
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            full_name: "John Doe".to_string(),
            avatar: "https://media.example/avatar.png".to_string(),
            cover_image: None,
            password_hash: "hash".to_string(),
        });
        user.refresh_token = Some("secret-refresh".to_string());

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["coverImage"], "");
        assert_eq!(json["fullName"], "John Doe");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("refreshToken").is_none());
    }
}
