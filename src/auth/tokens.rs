//! Cycle de vie des tokens: émission, rotation, invalidation.
//!
//! Le refresh token est persisté tel quel sur l'utilisateur. Un refresh token
//! présenté n'est accepté que s'il est signé avec le secret refresh, non
//! expiré, et identique octet par octet à la valeur stockée. Chaque refresh
//! réussi remplace la valeur stockée: un token déjà utilisé ne correspond plus.

use std::sync::Arc;

use uuid::Uuid;

use super::jwt::{Claims, JwtError, JwtManager};
use crate::db::store::UserStore;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenService {
    access: JwtManager,
    refresh: JwtManager,
    store: Arc<dyn UserStore>,
}

impl TokenService {
    pub fn new(access: JwtManager, refresh: JwtManager, store: Arc<dyn UserStore>) -> Self {
        Self {
            access,
            refresh,
            store,
        }
    }

    /// Émet une paire de tokens et persiste le refresh token sur l'utilisateur,
    /// en écrasant toute valeur précédente.
    ///
    /// Les tokens ne sont renvoyés qu'une fois la persistance réussie.
    pub fn issue_token_pair(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        let pair = self.sign_pair(user_id)?;

        if !self
            .store
            .set_refresh_token(user_id, Some(&pair.refresh_token))?
        {
            return Err(AppError::database(format!(
                "user {user_id} disappeared while issuing tokens"
            )));
        }

        tracing::debug!(%user_id, "Issued token pair");
        Ok(pair)
    }

    /// Vérifie un refresh token présenté et effectue une rotation complète.
    pub fn verify_and_rotate(&self, presented: &str) -> Result<TokenPair, AppError> {
        if presented.trim().is_empty() {
            return Err(AppError::MissingToken);
        }

        let claims = self.refresh.verify_token(presented).map_err(|e| {
            tracing::debug!(error = %e, "Rejected refresh token");
            AppError::from(e)
        })?;

        let user = self
            .store
            .find_by_id(claims.sub)?
            .ok_or(AppError::InvalidRefreshToken)?;

        if user.refresh_token.as_deref() != Some(presented) {
            tracing::warn!(user_id = %user.id, "Refresh token reuse detected");
            return Err(AppError::TokenMismatch);
        }

        let pair = self.sign_pair(user.id)?;

        // Deux refresh concurrents avec le même token: un seul gagne le swap
        if !self
            .store
            .swap_refresh_token(user.id, presented, &pair.refresh_token)?
        {
            tracing::warn!(user_id = %user.id, "Lost refresh token rotation race");
            return Err(AppError::TokenMismatch);
        }

        tracing::debug!(user_id = %user.id, "Rotated token pair");
        Ok(pair)
    }

    /// Efface le refresh token stocké (logout). Idempotent.
    pub fn invalidate(&self, user_id: Uuid) -> Result<(), AppError> {
        if !self.store.set_refresh_token(user_id, None)? {
            tracing::debug!(%user_id, "Invalidate called for unknown user");
        }
        Ok(())
    }

    /// Vérifie un access token (extracteur d'authentification).
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        self.access.verify_token(token).map_err(|e| match e {
            JwtError::GenerationFailed(e) => AppError::TokenGenerationFailed(e.to_string()),
            JwtError::Expired | JwtError::VerificationFailed(_) => AppError::InvalidAccessToken,
        })
    }

    fn sign_pair(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.access.generate_token(user_id)?,
            refresh_token: self.refresh.generate_token(user_id)?,
        })
    }
}
