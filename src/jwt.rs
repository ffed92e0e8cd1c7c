//! Access token generation and validation.
//!
//! Access tokens are HS256 JWTs carrying only issuer, subject and the two
//! timestamps. They are never stored; validity is decided from the token and
//! the clock alone.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Value of the `iss` claim on every token this service issues.
pub const ISSUER: &str = "chirpy";

/// Access token lifetime: 1 hour.
pub const ACCESS_TOKEN_DURATION: Duration = Duration::from_secs(60 * 60);

/// Clock skew tolerated past `exp`, in seconds.
pub const LEEWAY_SECS: u64 = 1;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Current unix time in whole seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer, always [`ISSUER`]
    pub iss: String,
    /// Subject (user id)
    pub sub: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// The token was rejected.
///
/// Deliberately carries no cause: malformed, forged and expired tokens are
/// indistinguishable to the caller. The cause is logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// Signing keys for access tokens, built once from the server secret.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue an access token for `subject`, valid from `now` for `ttl`.
    pub fn issue(&self, subject: Uuid, ttl: Duration, now: u64) -> Result<String, JwtError> {
        let claims = AccessClaims {
            iss: ISSUER.to_string(),
            sub: subject,
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
        };

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate a token at time `now` and return its subject.
    pub fn validate(&self, token: &str, now: u64) -> Result<Uuid, InvalidToken> {
        self.decode(token, now).map(|claims| claims.sub).map_err(|reason| {
            debug!(%reason, "Rejected access token");
            InvalidToken
        })
    }

    fn decode(&self, token: &str, now: u64) -> Result<AccessClaims, RejectReason> {
        // Expiry is checked below against the caller's clock, not the library's.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[ISSUER]);

        let claims = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidAlgorithm => RejectReason::Algorithm,
                ErrorKind::InvalidSignature => RejectReason::Signature,
                ErrorKind::InvalidIssuer => RejectReason::Issuer,
                _ => RejectReason::Malformed(e),
            })?
            .claims;

        if now > claims.exp.saturating_add(LEEWAY_SECS) {
            return Err(RejectReason::Expired { exp: claims.exp });
        }

        Ok(claims)
    }
}

/// Why a token was rejected. Only ever logged.
#[derive(Debug, Error)]
enum RejectReason {
    #[error("unexpected signing algorithm")]
    Algorithm,
    #[error("signature mismatch")]
    Signature,
    #[error("unexpected issuer")]
    Issuer,
    #[error("expired at {exp}")]
    Expired { exp: u64 },
    #[error("malformed token: {0}")]
    Malformed(jsonwebtoken::errors::Error),
}

/// Errors that can occur while issuing a token.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &[u8] = b"test-secret-key-for-testing";
    const NOW: u64 = 1_700_000_000;

    fn user() -> Uuid {
        Uuid::parse_str("7d3f1c2e-9b1a-4c55-8f0e-2a6b4d9e1f00").unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let config = JwtConfig::new(SECRET);
        let token = config.issue(user(), ACCESS_TOKEN_DURATION, NOW).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(config.validate(&token, NOW), Ok(user()));
    }

    #[test]
    fn test_claims_shape() {
        let config = JwtConfig::new(SECRET);
        let token = config.issue(user(), Duration::from_secs(60), NOW).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = jsonwebtoken::decode::<AccessClaims>(
            &token,
            &DecodingKey::from_secret(SECRET),
            &validation,
        )
        .unwrap();

        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(
            data.claims,
            AccessClaims {
                iss: ISSUER.to_string(),
                sub: user(),
                iat: NOW,
                exp: NOW + 60,
            }
        );
    }

    #[test]
    fn test_expiry_respects_leeway() {
        let config = JwtConfig::new(SECRET);
        let ttl = Duration::from_secs(10);
        let token = config.issue(user(), ttl, NOW).unwrap();

        assert!(config.validate(&token, NOW + 10).is_ok());
        assert!(config.validate(&token, NOW + 10 + LEEWAY_SECS).is_ok());
        assert_eq!(config.validate(&token, NOW + 12), Err(InvalidToken));
        assert_eq!(config.validate(&token, NOW + 10_000), Err(InvalidToken));
    }

    #[test]
    fn test_wrong_secret() {
        let config1 = JwtConfig::new(b"secret-1");
        let config2 = JwtConfig::new(b"secret-2");

        let token = config1.issue(user(), ACCESS_TOKEN_DURATION, NOW).unwrap();
        assert_eq!(config2.validate(&token, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_tampered_signature() {
        let config = JwtConfig::new(SECRET);
        let token = config.issue(user(), ACCESS_TOKEN_DURATION, NOW).unwrap();

        let (body, signature) = token.rsplit_once('.').unwrap();
        let mut sig = URL_SAFE_NO_PAD.decode(signature).unwrap();
        sig[0] ^= 0x01;
        let forged = format!("{}.{}", body, URL_SAFE_NO_PAD.encode(sig));

        assert_eq!(config.validate(&forged, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_tampered_payload() {
        let config = JwtConfig::new(SECRET);
        let token = config.issue(user(), ACCESS_TOKEN_DURATION, NOW).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let mut payload = String::from_utf8(payload).unwrap();
        payload = payload.replace(&format!("\"exp\":{}", NOW + 3600), "\"exp\":9999999999");
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            parts[2]
        );

        assert_ne!(forged, token);
        assert_eq!(config.validate(&forged, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let config = JwtConfig::new(SECRET);
        let claims = AccessClaims {
            iss: ISSUER.to_string(),
            sub: user(),
            iat: NOW,
            exp: NOW + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(config.validate(&token, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let config = JwtConfig::new(SECRET);
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            format!(
                r#"{{"iss":"chirpy","sub":"{}","iat":{},"exp":{}}}"#,
                user(),
                NOW,
                NOW + 60
            )
            .as_bytes(),
        );
        let token = format!("{}.{}.", header, payload);

        assert_eq!(config.validate(&token, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let config = JwtConfig::new(SECRET);
        let claims = AccessClaims {
            iss: "someone-else".to_string(),
            sub: user(),
            iat: NOW,
            exp: NOW + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(config.validate(&token, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        #[derive(Serialize)]
        struct LooseClaims<'a> {
            iss: &'a str,
            sub: &'a str,
            iat: u64,
            exp: u64,
        }

        let config = JwtConfig::new(SECRET);
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &LooseClaims {
                iss: ISSUER,
                sub: "alice",
                iat: NOW,
                exp: NOW + 60,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(config.validate(&token, NOW), Err(InvalidToken));
    }

    #[test]
    fn test_garbage_rejected() {
        let config = JwtConfig::new(SECRET);

        assert_eq!(config.validate("invalid-token", NOW), Err(InvalidToken));
        assert_eq!(config.validate("", NOW), Err(InvalidToken));
        assert_eq!(config.validate("a.b.c", NOW), Err(InvalidToken));
    }
}
