use axum::{extract::FromRequestParts, http::request::Parts};
use common::UserRole;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via the helpers below in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Returns true for the elevated roles (organizer, judge, admin).
    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }

    /// Returns `Ok(())` for elevated roles, `Err(Forbidden)` otherwise.
    pub fn require_reviewer(&self) -> Result<(), AppError> {
        if self.is_reviewer() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Returns `Ok(())` if the user may act as an event organizer.
    pub fn require_organizer(&self) -> Result<(), AppError> {
        if matches!(self.role, UserRole::Organizer | UserRole::Admin) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;
        let role = claims.role.parse().map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            role,
        })
    }
}
