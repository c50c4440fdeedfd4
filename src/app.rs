//! Application-level wiring: session context and browser logging.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root component calls [`provide_session`] once. Descendants read the
//! session with [`use_auth_state`] (reactive snapshot) and trigger flows
//! through [`use_session`].

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use leptos::prelude::*;

use crate::state::auth::{AuthState, SessionManager};

/// Install `manager` and a signal mirroring its state into the current
/// reactive scope, then start the startup session check.
///
/// The subscription and the mount end with the owning scope.
pub fn provide_session(manager: SessionManager) -> RwSignal<AuthState> {
    let auth = RwSignal::new(manager.state());
    let subscription = manager.subscribe(move |state| auth.set(state.clone()));
    provide_context(auth);
    provide_context(manager.clone());

    #[cfg(feature = "hydrate")]
    {
        crate::util::auth::install_unauth_redirect(auth, manager.navigator(), manager.api().storage());
        let token = manager.mount();
        let session = manager.clone();
        leptos::task::spawn_local(async move {
            session.initialize(token).await;
        });
    }

    on_cleanup(move || {
        manager.unsubscribe(subscription);
        manager.dispose();
    });
    auth
}

/// The session manager provided by [`provide_session`].
///
/// # Panics
///
/// Panics when called outside a scope that provided a session.
pub fn use_session() -> SessionManager {
    expect_context::<SessionManager>()
}

/// Reactive session state provided by [`provide_session`].
///
/// # Panics
///
/// Panics when called outside a scope that provided a session.
pub fn use_auth_state() -> RwSignal<AuthState> {
    expect_context::<RwSignal<AuthState>>()
}

/// Route `log` output and panics to the browser console.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Debug);
}
