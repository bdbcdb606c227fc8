//! Manages the WebSocket connection lifecycle for a simulated call.
//!
//! Each connection owns its own [`CallOrchestrator`], so conversation
//! history is isolated per caller; nothing is shared across connections.
//! Events are handled sequentially in arrival order, and replies are sent
//! in the order of their triggering events.

use super::protocol::{ClientEvent, ServerEvent};
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use callsim_core::orchestrator::{CallOrchestrator, Reply};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Listens for client events and drives the per-connection call
/// orchestrator until the client disconnects. The only suspension point is
/// the outstanding completion request inside the orchestrator; the client
/// waits for each reply before sending its next utterance, so no event
/// queueing is needed.
#[instrument(name = "ws_session", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    tracing::Span::current().record("connection_id", connection_id.to_string());
    info!("New WebSocket connection.");

    let (mut socket_tx, mut socket_rx) = socket.split();
    let mut orchestrator =
        CallOrchestrator::new(state.completion.clone(), state.system_prompt.as_str());

    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(ws_msg) => match ws_msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        if let Err(e) = handle_event(event, &mut orchestrator, &mut socket_tx).await
                        {
                            error!(error = ?e, "Failed to send reply to client.");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Ignoring unparseable client event.");
                    }
                },
                Message::Close(_) => {
                    info!("Client sent close frame. Shutting down session.");
                    break;
                }
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
            },
            Err(e) => {
                error!("Error receiving from client WebSocket: {:?}", e);
                break;
            }
        }
    }

    info!("WebSocket connection closed and call session discarded.");
}

/// Dispatches one client event to the orchestrator and emits the reply.
async fn handle_event(
    event: ClientEvent,
    orchestrator: &mut CallOrchestrator,
    socket_tx: &mut SplitSink<WebSocket, Message>,
) -> Result<()> {
    match event {
        ClientEvent::StartCall => {
            info!("Call started. Requesting the opening line.");
            let reply = orchestrator.start_call().await;
            send_reply(socket_tx, reply).await?;
        }
        ClientEvent::UserUtterance { text } => {
            match orchestrator.handle_utterance(&text).await {
                Some(reply) => {
                    if reply.end_call {
                        info!("Call ended.");
                    }
                    send_reply(socket_tx, reply).await?;
                }
                // The session is inert outside an active call; the
                // utterance is dropped without touching any history.
                None => warn!("Ignoring utterance outside an active call."),
            }
        }
    }
    Ok(())
}

async fn send_reply(socket_tx: &mut SplitSink<WebSocket, Message>, reply: Reply) -> Result<()> {
    send_event(
        socket_tx,
        ServerEvent::AssistantReply {
            text: reply.text,
            end_call: reply.end_call,
        },
    )
    .await
}

/// A helper function to serialize and send a `ServerEvent` to the client.
pub(crate) async fn send_event(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    event: ServerEvent,
) -> Result<()> {
    let serialized = serde_json::to_string(&event)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
