use super::*;
use crate::net::types::User;

fn user() -> User {
    serde_json::from_value(serde_json::json!({ "id": 1, "email": "a@b.com", "role": "etudiant" })).unwrap()
}

fn settled(user: Option<User>) -> AuthState {
    AuthState { user, loading: false, initialized: true, ended: false }
}

fn ended() -> AuthState {
    AuthState { ended: true, ..settled(None) }
}

// =============================================================
// should_redirect_unauth
// =============================================================

#[test]
fn waits_for_startup_check() {
    assert!(!should_redirect_unauth(&AuthState::default(), false));
    let loading = AuthState { loading: true, initialized: true, ..AuthState::default() };
    assert!(!should_redirect_unauth(&loading, false));
}

#[test]
fn redirects_settled_anonymous_without_credential() {
    assert!(should_redirect_unauth(&settled(None), false));
    assert!(!should_redirect_unauth(&settled(Some(user())), false));
}

#[test]
fn stored_credential_after_failed_check_is_not_redirected() {
    // A transient startup failure leaves the credential in place.
    assert!(!should_redirect_unauth(&settled(None), true));
}

#[test]
fn sessions_ended_by_the_manager_are_left_alone() {
    assert!(!should_redirect_unauth(&ended(), false));
}

// =============================================================
// unauth_redirect
// =============================================================

#[test]
fn protected_path_goes_to_login() {
    assert_eq!(unauth_redirect(&settled(None), false, "/dashboard/chat"), Some("/login"));
}

#[test]
fn transient_failure_on_protected_path_stays_put() {
    assert_eq!(unauth_redirect(&settled(None), true, "/dashboard"), None);
}

#[test]
fn public_path_is_left_alone() {
    assert_eq!(unauth_redirect(&settled(None), false, "/register"), None);
    assert_eq!(unauth_redirect(&settled(None), false, "/"), None);
}

#[test]
fn signed_in_user_is_never_redirected() {
    assert_eq!(unauth_redirect(&settled(Some(user())), false, "/dashboard"), None);
}
