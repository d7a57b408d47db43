//! Networking modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the REST gateway the session layer consumes through the
//! `UserGateway` trait, and `types` defines the JSON schema it speaks.

pub mod api;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;
