//! Redirect policy for lost sessions.
//!
//! The decision ([`redirect_target`]) is a pure function of the current path;
//! the action goes through a [`Navigator`] so the policy can be exercised
//! without a browser.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

/// Sign-in entry point.
pub const LOGIN_PATH: &str = "/login";

/// Routes reachable without a session. `/` matches only itself; the rest also
/// cover their sub-paths.
pub const PUBLIC_PATHS: [&str; 5] = ["/", "/login", "/register", "/forgot-password", "/reset-password"];

/// Whether `path` is reachable without a session.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    let path = normalize(path);
    PUBLIC_PATHS.iter().any(|public| {
        if *public == "/" {
            path == "/"
        } else {
            path == *public || path.strip_prefix(public).is_some_and(|rest| rest.starts_with('/'))
        }
    })
}

/// Where to send a user whose session was just lost, if anywhere.
///
/// Public paths stay put so login and recovery pages never loop.
#[must_use]
pub fn redirect_target(current_path: &str) -> Option<&'static str> {
    if is_public_path(current_path) { None } else { Some(LOGIN_PATH) }
}

/// Strip query/fragment and any trailing slash (except on the root).
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Navigation side of the redirect policy.
pub trait Navigator: Send + Sync {
    /// The path currently shown, e.g. `/dashboard/chat`.
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// `window.location`-backed navigator. Inert outside the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn current_path(&self) -> String {
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_else(|| "/".to_owned())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            "/".to_owned()
        }
    }

    fn navigate(&self, path: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(window) = web_sys::window() {
                if window.location().set_href(path).is_err() {
                    log::warn!("navigation to {path} failed");
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = path;
        }
    }
}
