//! Authentication state traits and macro.

use crate::session::Sessions;

/// Trait for state types that can authenticate access tokens.
pub trait HasSessions {
    fn sessions(&self) -> &Sessions;
}

/// Trait for state types that accept webhook calls.
pub trait HasWebhookKey {
    fn webhook_key(&self) -> &str;
}

/// Macro to implement `HasSessions` for state structs with the standard field.
///
/// The struct must have a `sessions: Arc<Sessions>` field.
///
/// # Example
/// ```ignore
/// use crate::impl_has_sessions;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub sessions: Arc<Sessions>,
///     // ... other fields
/// }
///
/// impl_has_sessions!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_sessions {
    ($state_type:ty) => {
        impl $crate::auth::HasSessions for $state_type {
            fn sessions(&self) -> &$crate::session::Sessions {
                &self.sessions
            }
        }
    };
}
