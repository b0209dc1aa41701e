use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

use statwox_auth::jwt::bearer_token;
use statwox_storage::users;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user resolved from a verified session token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// JWT validation middleware.
///
/// Extracts the `Authorization: Bearer <token>` header, verifies the token
/// and checks that its user still exists. On success, inserts `AuthUser`
/// into request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = header_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let user = resolve_user(&state, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// The caller's identity when a valid token is present, for routes that
/// also serve anonymous callers. A missing or invalid token is anonymous,
/// never an error.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = header_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        Ok(MaybeUser(resolve_user(state, &token).await?))
    }
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    bearer_token(header).map(str::to_owned)
}

/// Verify `token` and look its user up. `None` when either step fails.
async fn resolve_user(state: &AppState, token: &str) -> Result<Option<AuthUser>, ApiError> {
    let claims = match state.signer.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "rejected bearer token");
            return Ok(None);
        }
    };

    let user = users::get(&state.pool, claims.user_id).await?;
    if user.is_none() {
        debug!(user_id = %claims.user_id, "token subject no longer exists");
    }

    Ok(user.map(|u| AuthUser {
        id: u.id,
        email: u.email,
    }))
}
