//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use conjunto_core::error::CoreError;
use conjunto_core::roles::{grants, permission_code, ROLE_ADMIN};
use conjunto_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.require(MODULE_PQRS, ACTION_READ)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's role name (e.g. `"admin"`, `"resident"`).
    pub role: String,
    /// Permission codes granted to the role when the token was issued.
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Whether the user may perform `action` on `module`. Admins may do anything.
    pub fn can(&self, module: &str, action: &str) -> bool {
        self.is_admin() || grants(&self.permissions, module, action)
    }

    /// Reject with 403 unless the user may perform `action` on `module`.
    pub fn require(&self, module: &str, action: &str) -> AppResult<()> {
        if self.can(module, action) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "Missing permission {}",
                permission_code(module, action)
            ))))
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
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            permissions: claims.permissions,
        })
    }
}
