//! # marketplace-client
//!
//! Session and navigation core for the marketplace browser client.
//!
//! This crate owns the client-held session (login flag, cached profile,
//! acting-as identity), the observer registry that announces session
//! changes to views, the route metadata table, and the navigation guard
//! that decides whether a route transition is allowed. Rendering lives
//! elsewhere; `util::session_signal` is the seam to Leptos.

pub mod config;
pub mod net;
pub mod routes;
pub mod state;
pub mod util;
