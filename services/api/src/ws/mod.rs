//! WebSocket Session Management
//!
//! This module contains the core logic for handling simulated calls over
//! WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based event format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle, from upgrade to termination.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
