//! Route guard for protected pages.
//!
//! Covers the one case the session manager does not navigate for: the
//! startup check settled with nobody signed in and no credential stored.
//! Sessions the manager ended itself (logout, rejected credential) are
//! already redirected, and a stored credential means the check failed for a
//! transient reason, so neither triggers the guard.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use leptos::prelude::*;

use super::redirect::{Navigator, redirect_target};
use crate::state::auth::AuthState;
use crate::state::storage::{self, KeyValueStore};

/// Whether `state` is settled, anonymous, not already handled by the manager,
/// and backed by no stored credential.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState, has_credential: bool) -> bool {
    state.initialized && !state.loading && state.user.is_none() && !state.ended && !has_credential
}

/// Redirect target for `current_path`, if any.
#[must_use]
pub fn unauth_redirect(state: &AuthState, has_credential: bool, current_path: &str) -> Option<&'static str> {
    if should_redirect_unauth(state, has_credential) { redirect_target(current_path) } else { None }
}

/// Re-run the guard every time the session signal changes.
pub fn install_unauth_redirect(auth: RwSignal<AuthState>, navigator: Arc<dyn Navigator>, store: Arc<dyn KeyValueStore>) {
    Effect::new(move || {
        let state = auth.get();
        let has_credential = storage::credential(store.as_ref()).is_some();
        if let Some(target) = unauth_redirect(&state, has_credential, &navigator.current_path()) {
            navigator.navigate(target);
        }
    });
}
