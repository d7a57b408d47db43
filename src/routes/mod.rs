//! Client-side routing: route metadata, the navigation guard, and the
//! navigator that ties them to the session.

pub mod guard;
pub mod navigator;
pub mod table;
