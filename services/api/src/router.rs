//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application: a
//! short usage page at the root and the WebSocket endpoint.

use crate::{state::AppState, ws::ws_handler};
use axum::{Router, response::Html, routing::get};
use std::sync::Arc;

const USAGE_PAGE: &str = "\
<!doctype html>
<html>
<head><title>Call Simulation API</title></head>
<body>
<h1>Call Simulation API</h1>
<p>Connect a WebSocket client to <code>/ws</code> and send JSON events:</p>
<ul>
<li><code>{\"type\": \"start_call\"}</code> to begin a call</li>
<li><code>{\"type\": \"user_utterance\", \"text\": \"...\"}</code> for each recognized utterance</li>
</ul>
<p>The server replies with <code>{\"type\": \"assistant_reply\", \"text\": \"...\", \"end_call\": bool}</code>.</p>
</body>
</html>";

async fn usage() -> Html<&'static str> {
    Html(USAGE_PAGE)
}

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(usage))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
