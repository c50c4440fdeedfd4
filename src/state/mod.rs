//! Client-side session state.
//!
//! DESIGN
//! ======
//! `auth` owns the session lifecycle (startup check, login, registration,
//! logout); `storage` is the durable key/value seam it persists through.

pub mod auth;
pub mod storage;
