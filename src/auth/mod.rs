//! Request authentication.
//!
//! Clients present credentials in the `Authorization` header: `Bearer` for
//! access and refresh tokens, `ApiKey` for the payment provider webhook.
//! Route guards are axum extractors over any state implementing [`HasSessions`].

mod credentials;
mod errors;
mod extractors;
mod state;

pub use credentials::{API_KEY_SCHEME, BEARER_SCHEME, MissingCredential, api_key, bearer_token};
pub use errors::ApiAuthError;
pub use extractors::{Auth, BearerToken, WebhookAuth};
pub use state::{HasSessions, HasWebhookKey};
