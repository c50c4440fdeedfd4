//! Navigation helpers around the session.

pub mod auth;
pub mod redirect;
