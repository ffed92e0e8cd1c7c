//! Parsing of `Authorization` header credentials.

use axum::http::{HeaderMap, header};
use thiserror::Error;

/// Scheme used by clients presenting access or refresh tokens.
pub const BEARER_SCHEME: &str = "Bearer";

/// Scheme used by the payment provider's webhook calls.
pub const API_KEY_SCHEME: &str = "ApiKey";

/// No usable credential was found in the request.
///
/// Covers a missing header, a value that is not `<scheme> <credential>`,
/// and a scheme other than the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing or malformed authorization header")]
pub struct MissingCredential;

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, MissingCredential> {
    credential(headers, BEARER_SCHEME)
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<&str, MissingCredential> {
    credential(headers, API_KEY_SCHEME)
}

fn credential<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, MissingCredential> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(MissingCredential)?
        .to_str()
        .map_err(|_| MissingCredential)?;

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(found), Some(credential), None) if found.eq_ignore_ascii_case(scheme) => {
            Ok(credential)
        }
        _ => Err(MissingCredential),
    }
}
