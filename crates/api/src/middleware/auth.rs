//! Authentication extractors for Axum handlers.

use agency_core::error::CoreError;
use agency_core::roles::{Actor, Role};
use agency_core::types::DbId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::jwt::{digest_api_key, validate_token};
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the automation API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, role = %auth.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub role: Role,
}

impl AuthUser {
    /// The identity the workflow authorizes against.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }

    /// Validate a raw token. Shared by the header extractor and the
    /// WebSocket handshake.
    pub fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;
        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key("authorization") {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            )));
        }
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;
        AuthUser::from_token(token, state)
    }
}

/// Caller of the automation surface. Carries the admin actor it stands in for.
#[derive(Debug, Clone, Copy)]
pub struct AutomationKey {
    pub actor: Actor,
}

impl FromRequestParts<AppState> for AutomationKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(automation) = &state.config.automation else {
            return Err(AppError::Core(CoreError::Forbidden(
                "Automation access is not configured".into(),
            )));
        };

        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-API-Key header".into()))
            })?;

        if digest_api_key(key) != automation.key_digest {
            tracing::warn!("Rejected automation call with an unknown API key");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid API key".into(),
            )));
        }

        Ok(AutomationKey {
            actor: Actor::new(automation.actor_id, Role::Admin),
        })
    }
}
