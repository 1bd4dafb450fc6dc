//! Explicit session context handed to the HTTP client.
//!
//! Holds the bearer token and the caller's reaction to a rejected token.
//! Nothing here is global: every client gets the session it was built with.

use std::sync::{Arc, RwLock};

/// Called after the API answers 401 and the token has been cleared.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Shared, cloneable session. Clones see the same token.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token)),
            on_unauthorized: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Install the hook run when the server rejects the token.
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Drop the token and notify the caller.
    pub(crate) fn expire(&self) {
        self.clear();
        tracing::warn!("session rejected by server; token cleared");
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }
}
