//! Defines the WebSocket event protocol between the browser client and the API server.

use serde::{Deserialize, Serialize};

/// Events sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Starts a call, replacing any session already active on this
    /// connection. Carries no payload.
    StartCall,
    /// One utterance of recognized speech, transcribed client-side.
    UserUtterance { text: String },
}

/// Events sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The next scripted line for the client to speak aloud. When
    /// `end_call` is set the client stops listening and closes its call UI.
    AssistantReply { text: String, end_call: bool },
}
