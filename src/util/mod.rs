//! Utility helpers shared across the client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser and framework concerns (storage,
//! reactive signals) from the session and routing logic.

pub mod session_signal;
pub mod storage;
