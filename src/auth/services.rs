// src/auth/services.rs

use std::sync::Arc;

use account_manager_api::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use uuid::Uuid;

use super::password::PasswordManager;
use super::tokens::{TokenPair, TokenService};
use crate::db::models::user::NewUser;
use crate::db::store::UserStore;
use crate::error::AppError;
use crate::media::{MediaUploader, TempUpload};

/// Formulaire d'inscription: champs texte + fichiers reçus.
///
/// Les fichiers sont des [`TempUpload`]: abandonner le formulaire sur une
/// erreur suffit à les supprimer du disque.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub fields: RegisterRequest,
    pub avatar: Option<TempUpload>,
    pub cover_image: Option<TempUpload>,
}

/// Champs d'inscription validés (non vides, trimés sauf le mot de passe).
#[derive(Debug)]
struct Registration {
    full_name: String,
    email: String,
    username: String,
    password: String,
}

// Bornes des colonnes VARCHAR de la table users
const MAX_USERNAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 255;
const MAX_FULL_NAME_LEN: usize = 255;

impl Registration {
    fn from_request(request: &RegisterRequest) -> Result<Self, AppError> {
        let trimmed = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        // Le mot de passe est conservé tel quel: seul le test "vide" ignore les espaces
        let password = request
            .password
            .clone()
            .filter(|p| !p.trim().is_empty());

        let (Some(full_name), Some(email), Some(username), Some(password)) = (
            trimmed(&request.full_name),
            trimmed(&request.email),
            trimmed(&request.username),
            password,
        ) else {
            return Err(AppError::validation("All fields are required"));
        };

        for (field, value, max) in [
            ("username", &username, MAX_USERNAME_LEN),
            ("email", &email, MAX_EMAIL_LEN),
            ("fullName", &full_name, MAX_FULL_NAME_LEN),
        ] {
            if value.chars().count() > max {
                return Err(AppError::validation(format!(
                    "{field} must be at most {max} characters"
                )));
            }
        }

        Ok(Self {
            full_name,
            email,
            username,
            password,
        })
    }
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    uploader: Arc<dyn MediaUploader>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        uploader: Arc<dyn MediaUploader>,
        tokens: TokenService,
    ) -> Self {
        Self {
            store,
            uploader,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Inscription d'un nouvel utilisateur
    pub async fn register(&self, form: RegisterForm) -> Result<UserResponse, AppError> {
        let RegisterForm {
            fields,
            avatar,
            cover_image,
        } = form;

        let registration = Registration::from_request(&fields)?;

        if !Self::is_valid_email(&registration.email) {
            return Err(AppError::InvalidEmail);
        }

        // Vérifier que ni l'email ni le username n'existent
        if self
            .store
            .find_by_username_or_email(Some(&registration.username), Some(&registration.email))?
            .is_some()
        {
            return Err(AppError::UserAlreadyExists);
        }

        let avatar = avatar.ok_or_else(|| AppError::validation("Avatar image is required"))?;

        let avatar = self.uploader.upload(avatar).await.map_err(|e| {
            tracing::error!(error = %e, "Avatar upload failed");
            AppError::from(e)
        })?;
        tracing::debug!(public_id = %avatar.public_id, "Avatar uploaded");

        // L'image de couverture est optionnelle: un échec n'empêche pas l'inscription
        let cover_image = match cover_image {
            Some(file) => match self.uploader.upload(file).await {
                Ok(media) => Some(media.url),
                Err(e) => {
                    tracing::warn!(error = %e, "Cover image upload failed, continuing without it");
                    None
                }
            },
            None => None,
        };

        let password_hash = PasswordManager::hash(&registration.password)?;

        let new_user = NewUser {
            username: registration.username,
            email: registration.email,
            full_name: registration.full_name,
            avatar: avatar.url,
            cover_image,
            password_hash,
        };

        let user = self.store.create(&new_user).map_err(|e| match AppError::from(e) {
            // Course entre la vérification et l'insertion
            AppError::Duplicate(_) => AppError::UserAlreadyExists,
            other => other,
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.into())
    }

    /// Connexion d'un utilisateur
    pub fn login(&self, login_request: &LoginRequest) -> Result<LoginResponse, AppError> {
        let identifier = login_request
            .identifier()
            .ok_or_else(|| AppError::validation("username or email is required"))?;

        if login_request.password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        // Recherche l'utilisateur
        let user = self
            .store
            .find_by_username_or_email(identifier.username, identifier.email)?
            .ok_or_else(|| AppError::not_found("User does not exist"))?;

        // Vérifie le password
        if !PasswordManager::verify(&login_request.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: invalid password");
            return Err(AppError::InvalidPassword);
        }

        let TokenPair {
            access_token,
            refresh_token,
        } = self.tokens.issue_token_pair(user.id)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }

    /// Déconnexion: révoque le refresh token de l'utilisateur
    pub fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.tokens.invalidate(user_id)?;
        tracing::info!(%user_id, "User logged out");
        Ok(())
    }

    /// Rafraîchit les tokens
    pub fn refresh(&self, presented_refresh_token: &str) -> Result<TokenPair, AppError> {
        self.tokens.verify_and_rotate(presented_refresh_token)
    }

    /// Récupère l'utilisateur courant
    pub fn get_current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        self.store
            .find_by_id(user_id)?
            .map(UserResponse::from)
            .ok_or(AppError::InvalidAccessToken)
    }

    // === Helpers de validation ===

    fn is_valid_email(email: &str) -> bool {
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            }
            None => false,
        }
    }
}
