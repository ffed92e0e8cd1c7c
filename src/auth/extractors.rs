//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;
use tracing::warn;
use uuid::Uuid;

use super::credentials::{api_key, bearer_token};
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::{HasSessions, HasWebhookKey};
use crate::jwt::unix_now;

/// Extractor for endpoints that require a valid access token.
/// Yields the authenticated user id.
pub struct Auth(pub Uuid);

impl<S> FromRequestParts<S> for Auth
where
    S: HasSessions + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .map_err(|_| ApiAuthError::new(AuthErrorKind::NotAuthenticated))?;

        state
            .sessions()
            .authenticate(token, unix_now())
            .map(Auth)
            .map_err(|_| ApiAuthError::new(AuthErrorKind::InvalidToken))
    }
}

/// Raw bearer credential, for endpoints that take a refresh token.
/// Only checks the header shape; the token itself is judged by the handler.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(|token| BearerToken(token.to_string()))
            .map_err(|_| ApiAuthError::new(AuthErrorKind::NotAuthenticated))
    }
}

/// Extractor for the payment provider webhook. Requires
/// `Authorization: ApiKey <key>` matching the configured key.
pub struct WebhookAuth;

impl<S> FromRequestParts<S> for WebhookAuth
where
    S: HasWebhookKey + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = api_key(&parts.headers)
            .map_err(|_| ApiAuthError::new(AuthErrorKind::NotAuthenticated))?;

        if !key_matches(key, state.webhook_key()) {
            warn!("Rejected webhook call with wrong API key");
            return Err(ApiAuthError::new(AuthErrorKind::InvalidApiKey));
        }

        Ok(WebhookAuth)
    }
}

/// Compare a presented API key with the configured one in constant time.
/// An empty configured key never matches.
fn key_matches(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches() {
        assert!(key_matches("f271c81ff7084ee5", "f271c81ff7084ee5"));
        assert!(!key_matches("f271c81ff7084ee6", "f271c81ff7084ee5"));
        assert!(!key_matches("f271c81ff7084ee", "f271c81ff7084ee5"));
        assert!(!key_matches("", ""));
        assert!(!key_matches("anything", ""));
    }
}
