//! Call-simulation API Library Crate
//!
//! This library contains all the core logic for the call-simulation web
//! service: the application state, WebSocket protocol and session handling,
//! and routing. The `api.rs` binary is a thin wrapper around this library.

pub mod config;
pub mod router;
pub mod state;
pub mod ws;
