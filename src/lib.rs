//! # sujets-client
//!
//! Session and API access layer for the thesis subject discovery front end.
//!
//! The crate owns the two pieces of the browser client that carry real
//! behavior: the REST request wrapper (`net`) that attaches the bearer
//! credential and classifies responses, and the session manager (`state`)
//! that drives login, registration, logout and the startup session check.
//! Pages and components consume the session through the Leptos context
//! installed by [`app::provide_session`].
//!
//! Browser-only glue (`gloo-net`, `localStorage`, `window.location`) is
//! gated behind the `hydrate` feature; without it the browser seams are
//! inert so the crate builds and tests natively.

pub mod app;
pub mod config;
pub mod net;
pub mod state;
pub mod util;
