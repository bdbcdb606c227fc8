//! Conversation history for a single simulated call.
//!
//! A session is an ordered, append-only sequence of role-tagged turns. The
//! fixed system instruction is inserted when the session is created and is
//! always the first turn; user and assistant turns accumulate behind it for
//! the lifetime of the call. A new call replaces the whole session rather
//! than editing it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The speaker of a single turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message in a conversation history.
///
/// Serializes to the `{"role": ..., "content": ...}` shape the completion
/// service consumes, so a turn history can be sent on the wire as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The ordered turn history of one call.
///
/// Exactly one system turn exists and it is always first. That invariant is
/// enforced by construction: the system instruction goes in via [`new`] and
/// only user and assistant turns can be appended afterwards. Turns are never
/// removed.
///
/// [`new`]: CallSession::new
#[derive(Debug, Clone)]
pub struct CallSession {
    turns: Vec<Turn>,
}

impl CallSession {
    /// Creates a session holding only the fixed system instruction.
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(system_instruction)],
        }
    }

    /// Appends a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::user(content));
    }

    /// Appends an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::assistant(content));
    }

    /// The full history, system turn first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
