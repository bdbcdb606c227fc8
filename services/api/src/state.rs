//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources like the completion-service client and the system
//! prompt loaded at startup.

use crate::config::Config;
use callsim_core::completion::CompletionService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionService>,
    pub system_prompt: Arc<String>,
    pub config: Arc<Config>,
}
