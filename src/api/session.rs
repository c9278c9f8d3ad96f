//! WebSocket session handling
//!
//! Each connection runs a reader loop plus a single writer task fed by
//! an mpsc channel. Every prompt request spawns its own pipeline task,
//! so requests on one connection stay independent: a failure in one
//! never touches another that is mid-stream. There is no cancellation;
//! a client disconnecting mid-stream just makes the remaining sends
//! no-ops while the generation runs to its natural end.

use std::sync::Arc;

use axum::extract::ws::Message;
use axum::extract::ws::WebSocket;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use crate::api::events::ClientEvent;
use crate::api::events::PromptRequest;
use crate::api::events::ResponseChunk;
use crate::api::events::ServerEvent;
use crate::api::handlers::AppState;
use crate::rag::ChatPipeline;
use crate::rag::PromptQuery;

/// Upgrade handler for `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one client connection until it closes
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    info!("Client connected: {}", connection_id);

    let (mut sink, mut stream) = socket.split();

    // Single writer task; request tasks send through the channel so
    // concurrent streams never interleave partial frames.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(text)).await.is_err() {
                // Client went away; stop writing and let senders drop.
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!("Connection {} read error: {}", connection_id, e);
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::SendPrompt(request)) => {
                    let pipeline = Arc::clone(&state.pipeline);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        run_prompt(connection_id, &pipeline, request, &tx).await;
                    });
                }
                Err(e) => {
                    warn!("Connection {} sent malformed event: {}", connection_id, e);
                    let _ = tx.send(ServerEvent::Error(
                        "Invalid or missing prompt data".to_string(),
                    ));
                }
            },
            Message::Close(_) => break,
            // Ping/pong is answered by the protocol layer
            _ => {}
        }
    }

    info!("Client disconnected: {}", connection_id);
    drop(tx);
    let _ = writer.await;
}

/// Drive one prompt through the pipeline, relaying fragments as they
/// arrive
///
/// Send failures are ignored throughout: they only mean the client is
/// gone, and the stream still runs to its natural end.
async fn run_prompt(
    connection_id: Uuid,
    pipeline: &ChatPipeline,
    request: PromptRequest,
    tx: &mpsc::UnboundedSender<ServerEvent>,
) {
    debug!(
        "Connection {} prompt received (developer_output={}, namespace={:?}, top_k={})",
        connection_id, request.developer_output, request.namespace, request.top_k
    );

    let query = PromptQuery {
        prompt: request.prompt,
        namespace: request.namespace,
        top_k: request.top_k,
        verbose: request.developer_output,
    };

    let mut stream = match pipeline.execute(query).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Connection {} pipeline error: {}", connection_id, e);
            let _ = tx.send(ServerEvent::Error(e.to_string()));
            return;
        }
    };

    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(fragment) => {
                let terminal = fragment.is_terminal();
                let _ = tx.send(ServerEvent::ResponseChunk(ResponseChunk::from(fragment)));
                if terminal {
                    break;
                }
            }
            Err(e) => {
                error!("Connection {} stream error: {}", connection_id, e);
                let _ = tx.send(ServerEvent::Error(e.to_string()));
                return;
            }
        }
    }

    debug!("Connection {} prompt completed", connection_id);
}
