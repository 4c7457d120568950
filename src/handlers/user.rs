use account_manager_api::UserResponse;
use axum::extract::State;

use crate::app::AppState;
use crate::auth::extractors::AuthClaims;
use crate::error::AppError;
use crate::response::AppResponse;

/// GET /api/v1/users/current-user
/// Récupère le profil de l'utilisateur courant
pub async fn get_current_user(
    claims: AuthClaims,
    State(state): State<AppState>,
) -> Result<AppResponse<UserResponse>, AppError> {
    let user = state.auth.get_current_user(claims.sub)?;
    Ok(AppResponse::ok(user).with_message("Current user fetched successfully"))
}
