//! Session manager: the single owner of who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The manager sits between the UI and [`ApiClient`]. It is the only writer
//! of the stored credential and the only place session state changes. UI
//! code reads snapshots through [`SessionManager::state`] or subscribes to
//! changes; `app::provide_session` mirrors those into a Leptos signal.
//!
//! The client handed out by [`SessionManager::api`] reports every 401 back
//! here, so a credential rejected mid-session ends the session the same way
//! a rejected startup check does. The manager's own flows use a client
//! without that hook and handle their failures themselves.
//!
//! DESIGN
//! ======
//! Flows run on the browser event loop and await the API one step at a time.
//! A startup check can outlive the component that started it, so every
//! mutation it makes is checked against a generation counter. `mount` and
//! `dispose` bump the counter. Login, registration and logout bump it too,
//! so a slow startup check never overwrites a session established after it
//! began.
//!
//! The manager owns navigation for every session it ends (logout, rejected
//! credential). Such states carry `ended`, so the route guard in
//! `util::auth` leaves them alone.
//!
//! TRADE-OFFS
//! ==========
//! Concurrent logins are not serialized; the last one to finish wins.
//! In-flight requests are never cancelled, only their effects discarded.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::storage::{self, ACCESS_TOKEN_KEY, KeyValueStore};
use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{RegisterRequest, User};
use crate::util::redirect::{self, BrowserNavigator, LOGIN_PATH, Navigator};

/// Shown when a failed login carries no readable message.
pub const LOGIN_FAILED_MESSAGE: &str = "Échec de la connexion";
/// Shown when a failed registration carries no readable message.
pub const REGISTER_FAILED_MESSAGE: &str = "Échec de l'inscription";

const MISSING_LOGIN_TOKEN: &str = "No access token received";
const MISSING_REGISTER_TOKEN: &str = "No access token after registration";

// =============================================================================
// STATE
// =============================================================================

/// Coarse lifecycle phase derived from [`AuthState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// The startup check has not run yet.
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    /// Set once the first session check (or any auth flow) has completed.
    pub initialized: bool,
    /// Set when logout or a rejected credential ended the session. The
    /// manager has already redirected.
    pub ended: bool,
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if !self.initialized {
            SessionPhase::Uninitialized
        } else if self.user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn anonymous() -> Self {
        Self { user: None, loading: false, initialized: true, ended: false }
    }

    fn ended() -> Self {
        Self { ended: true, ..Self::anonymous() }
    }

    fn authenticated(user: User) -> Self {
        Self { user: Some(user), loading: false, initialized: true, ended: false }
    }
}

/// Failure of a login or registration flow.
///
/// `message` is ready to show; the underlying API error is kept as the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    message: String,
    #[source]
    cause: ApiError,
}

impl AuthError {
    fn new(cause: ApiError, fallback: &str) -> Self {
        let message = cause.user_message().unwrap_or_else(|| fallback.to_owned());
        Self { message, cause }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The API error that ended the flow.
    #[must_use]
    pub fn kind(&self) -> &ApiError {
        &self.cause
    }
}

/// Proof that a startup check belongs to the current mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountToken {
    generation: u64,
}

// =============================================================================
// MANAGER
// =============================================================================

type Observer = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Shared session handle. Cheap to clone; clones observe the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    /// Handed out to callers; reports 401s back to the manager.
    api: ApiClient,
    /// Used by the manager's own flows.
    flow_api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<AuthState>,
    generation: AtomicU64,
    observers: Mutex<Vec<(u64, Observer)>>,
    next_observer: AtomicU64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*lock(&self.inner.state))
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Manager persisting through the client's own credential store.
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        let storage = api.storage();
        let flow_api = api.without_unauthorized_hook();
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let api = flow_api.with_unauthorized_hook(move || {
                if let Some(inner) = weak.upgrade() {
                    SessionManager { inner }.handle_unauthorized();
                }
            });
            Inner {
                api,
                flow_api,
                storage,
                navigator,
                state: Mutex::new(AuthState::default()),
                generation: AtomicU64::new(0),
                observers: Mutex::new(Vec::new()),
                next_observer: AtomicU64::new(0),
            }
        });
        Self { inner }
    }

    /// Manager wired to the browser API client and `window.location`.
    pub fn browser() -> Self {
        Self::new(ApiClient::browser(), Arc::new(BrowserNavigator))
    }

    /// API client for application calls. A 401 from any of them ends the session.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::clone(&self.inner.navigator)
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        lock(&self.inner.state).clone()
    }

    /// Register `observer` to run after every state change. Returns an id for
    /// [`Self::unsubscribe`].
    pub fn subscribe(&self, observer: impl Fn(&AuthState) + Send + Sync + 'static) -> u64 {
        let id = self.inner.next_observer.fetch_add(1, Ordering::SeqCst);
        lock(&self.inner.observers).push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        lock(&self.inner.observers).retain(|(observer_id, _)| *observer_id != id);
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Start a new mount. Any earlier token stops being current.
    pub fn mount(&self) -> MountToken {
        MountToken { generation: self.supersede() }
    }

    /// End the current mount; pending startup checks are discarded.
    pub fn dispose(&self) {
        self.supersede();
        log::debug!("session manager disposed");
    }

    #[must_use]
    pub fn is_current(&self, token: MountToken) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == token.generation
    }

    /// Resolve the stored credential into a session.
    ///
    /// Without a credential the session becomes anonymous and no request is
    /// made. A rejected credential clears the session keys and redirects off
    /// protected pages. Any other failure leaves the cached user untouched.
    ///
    /// A check superseded while in flight changes nothing further; the state
    /// it already set (`loading`) is left for the next mount or flow to replace.
    pub async fn initialize(&self, token: MountToken) {
        if !self.is_current(token) {
            log::debug!("skipping session check for a stale mount");
            return;
        }
        if storage::credential(self.inner.storage.as_ref()).is_none() {
            log::debug!("no stored credential; starting anonymous");
            self.update(|state| *state = AuthState::anonymous());
            return;
        }

        self.update(|state| state.loading = true);
        let result = self.inner.flow_api.current_user().await;
        if !self.is_current(token) {
            log::debug!("discarding session check result for a stale mount");
            return;
        }

        match result {
            Ok(user) => {
                log::info!("session restored for user {}", user.id);
                self.update(|state| *state = AuthState::authenticated(user));
            }
            Err(ApiError::Unauthorized) => {
                log::info!("stored credential rejected; clearing session");
                self.end_session();
            }
            Err(e) => {
                log::warn!("session check failed: {e}");
                self.update(|state| {
                    state.loading = false;
                    state.initialized = true;
                });
            }
        }
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    /// Sign in and load the user.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the credentials are rejected, no access
    /// token comes back, or the user cannot be loaded. The session is cleared
    /// in every failure case.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.begin_flow();
        let result = self.establish_session(email, password, MISSING_LOGIN_TOKEN).await;
        self.finish_flow("login", result, LOGIN_FAILED_MESSAGE)
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::login`].
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, AuthError> {
        self.begin_flow();
        let result = match self.inner.flow_api.register(data).await {
            Ok(_) => self.establish_session(&data.email, &data.password, MISSING_REGISTER_TOKEN).await,
            Err(e) => Err(e),
        };
        self.finish_flow("registration", result, REGISTER_FAILED_MESSAGE)
    }

    /// Drop the session and go to the login page. Never waits on the network.
    pub fn logout(&self) {
        self.supersede();
        storage::clear_session(self.inner.storage.as_ref());
        self.update(|state| *state = AuthState::ended());
        log::info!("signed out");
        self.inner.navigator.navigate(LOGIN_PATH);
    }

    /// React to a 401 on an application call: the credential is gone, so the
    /// session ends and protected pages redirect to login.
    fn handle_unauthorized(&self) {
        log::info!("credential rejected mid-session; clearing session");
        self.supersede();
        self.end_session();
    }

    /// Replace the cached user, e.g. after a profile edit.
    pub fn update_user(&self, user: User) {
        self.update(|state| {
            state.user = Some(user);
            state.initialized = true;
            state.ended = false;
        });
    }

    fn begin_flow(&self) {
        self.supersede();
        self.update(|state| state.loading = true);
    }

    async fn establish_session(&self, email: &str, password: &str, missing_token: &'static str) -> Result<User, ApiError> {
        let tokens = self.inner.flow_api.login(email, password).await?;
        let token = tokens.usable_token().ok_or(ApiError::InvalidCredentialResponse(missing_token))?;
        self.inner.storage.set(ACCESS_TOKEN_KEY, token);
        self.inner.flow_api.current_user().await
    }

    fn finish_flow(&self, flow: &str, result: Result<User, ApiError>, fallback: &str) -> Result<User, AuthError> {
        match result {
            Ok(user) => {
                log::info!("{flow} succeeded for user {}", user.id);
                self.update(|state| *state = AuthState::authenticated(user.clone()));
                Ok(user)
            }
            Err(cause) => {
                log::warn!("{flow} failed: {cause}");
                storage::clear_session(self.inner.storage.as_ref());
                self.update(|state| *state = AuthState::anonymous());
                Err(AuthError::new(cause, fallback))
            }
        }
    }

    fn end_session(&self) {
        storage::clear_session(self.inner.storage.as_ref());
        self.update(|state| *state = AuthState::ended());
        self.redirect_if_protected();
    }

    fn redirect_if_protected(&self) {
        let path = self.inner.navigator.current_path();
        if let Some(target) = redirect::redirect_target(&path) {
            log::info!("redirecting {path} -> {target}");
            self.inner.navigator.navigate(target);
        }
    }

    /// Invalidate outstanding mount tokens and return the new generation.
    fn supersede(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn update(&self, mutate: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = lock(&self.inner.state);
            let before = state.clone();
            mutate(&mut state);
            if *state == before {
                return;
            }
            state.clone()
        };
        // Observers run unlocked so they may call back into the manager.
        let observers: Vec<Observer> = lock(&self.inner.observers).iter().map(|(_, o)| Arc::clone(o)).collect();
        for observer in observers {
            observer(&snapshot);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
