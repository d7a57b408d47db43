//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` is the store, `events` the observer registry it owns, and
//! `auth` the login/logout flows layered on top.

pub mod auth;
pub mod events;
pub mod session;
