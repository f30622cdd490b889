use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashSet;

use super::api::error::ErrorResponse;
use super::config::Permission;
use super::state::AppState;

/// Caller resolved from a configured API key.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub name: String,
    pub permissions: HashSet<Permission>,
}

impl AuthenticatedUser {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingAuth,
    InvalidFormat,
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingAuth => "Missing Authorization header",
            AuthError::InvalidFormat => "Invalid Authorization format",
            AuthError::InvalidKey => "Invalid API key",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::with_message("unauthorized", message)),
        )
            .into_response()
    }
}

#[derive(Debug)]
pub struct PermissionError(pub Permission);

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::with_message(
                "forbidden",
                &format!("Insufficient permissions: {:?} required", self.0),
            )),
        )
            .into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidFormat)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = bearer_token(&parts.headers).inspect_err(|e| {
            log::debug!("Rejected {} {}: {:?}", parts.method, parts.uri, e);
        })?;

        let api_key = state.config.find_api_key(key).ok_or_else(|| {
            log::warn!("Unknown API key used for {} {}", parts.method, parts.uri);
            AuthError::InvalidKey
        })?;

        Ok(AuthenticatedUser {
            name: api_key.name.clone(),
            permissions: api_key.permissions.clone(),
        })
    }
}

pub fn require_permission(
    user: &AuthenticatedUser,
    permission: Permission,
) -> Result<(), PermissionError> {
    if user.has_permission(permission) {
        Ok(())
    } else {
        log::warn!("{} lacks permission {:?}", user.name, permission);
        Err(PermissionError(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer secret")), Ok("secret"));
        assert_eq!(bearer_token(&headers("Basic abc")), Err(AuthError::InvalidFormat));
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingAuth));
    }

    #[test]
    fn checks_permissions() {
        let user = AuthenticatedUser {
            name: "operator".into(),
            permissions: HashSet::from([Permission::UpdateSatellites]),
        };
        assert!(require_permission(&user, Permission::UpdateSatellites).is_ok());
        assert!(require_permission(&user, Permission::UpdateConfig).is_err());
    }
}
