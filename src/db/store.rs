use uuid::Uuid;

use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, User};

/// Accès aux comptes utilisateurs.
///
/// Le champ `refresh_token` de chaque utilisateur est la seule source de
/// vérité pour la validité d'un refresh token.
pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Cherche un utilisateur dont le username OU l'email correspond.
    /// Renvoie `None` si aucun des deux n'est fourni.
    fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, RepositoryError>;

    /// Échoue avec `UniqueViolation` si le username ou l'email est déjà pris.
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError>;

    /// Écrase le refresh token stocké. Renvoie `false` si l'utilisateur n'existe pas.
    fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<bool, RepositoryError>;

    /// Compare-and-swap: remplace le token stocké par `next` uniquement s'il vaut
    /// encore `current`. Renvoie `false` si un autre refresh est passé avant.
    fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, RepositoryError>;
}
