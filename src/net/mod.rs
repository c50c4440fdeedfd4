//! Networking modules for the REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` exposes the request wrapper and endpoint helpers, `request` and
//! `response` describe one call on either side of the wire, `transport` is
//! the HTTP seam, and `types` defines the shared wire schema.

pub mod api;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
