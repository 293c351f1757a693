use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use upstac_core::config::Config;
use upstac_core::types::Role;
use upstac_core::user::{User, UserDirectory};

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
///
/// Rejects with 401 when the header is missing or the token is unknown.
/// This runs before, and is kept distinct from, the per-handler role guards
/// that answer 403: a caller with no identity is told to authenticate, a
/// known caller with the wrong role is told they are not allowed.
/// Handlers pass the inner user explicitly into core operations.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

        let root = app.root.clone();
        let user = tokio::task::spawn_blocking(move || {
            let config = Config::load(&root)?;
            Ok::<_, upstac_core::UpstacError>(config.find_by_token(&token))
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                tracing::warn!(path = %parts.uri.path(), "unknown api token");
                Err(AppError::unauthorized("invalid token"))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Role guard: the caller must hold at least one of `roles`.
pub fn require_any(user: &User, roles: &[Role]) -> Result<(), AppError> {
    if user.has_any_role(roles) {
        return Ok(());
    }
    let wanted: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
    Err(AppError::forbidden(format!(
        "user '{}' requires one of: {}",
        user.username,
        wanted.join(", ")
    )))
}

pub fn require(user: &User, role: Role) -> Result<(), AppError> {
    require_any(user, &[role])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn role_guard() {
        let tester = User::new(1, "t1", [Role::Tester]);
        assert!(require(&tester, Role::Tester).is_ok());
        let err = require(&tester, Role::Doctor).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
        assert!(require_any(&tester, &[Role::Doctor, Role::Tester]).is_ok());
    }
}
