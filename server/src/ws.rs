use std::path::Path;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::game_loop::GameCommand;
use crate::protocol::{ClientMsg, ServerMsg};

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub connection_semaphore: Arc<Semaphore>,
    pub max_message_bytes: usize,
    pub outbound_queue: usize,
}

impl AppState {
    pub fn new(game_tx: mpsc::Sender<GameCommand>, config: &ServerConfig) -> Self {
        Self {
            game_tx,
            connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
            max_message_bytes: config.max_message_bytes,
            outbound_queue: config.outbound_queue,
        }
    }
}

/// `/ws` for the game protocol, plus the client files when a directory is given.
pub fn router(app_state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new().route("/ws", get(ws_handler));

    if let Some(dir) = static_dir {
        if dir.is_dir() {
            tracing::info!("Serving static files from {}", dir.display());
            app = app.fallback_service(ServeDir::new(dir));
        } else {
            tracing::warn!("Static dir {} not found, not serving files", dir.display());
        }
    }

    app.layer(CorsLayer::permissive()).with_state(app_state)
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let permit = match app_state.connection_semaphore.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!("Connection limit reached, refusing upgrade");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    ws.max_message_size(app_state.max_message_bytes)
        .max_frame_size(app_state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, app_state, permit))
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::channel::<ServerMsg>(app_state.outbound_queue);

    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::Connect {
            outbound,
            response: resp_tx,
        })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Connect command");
        return;
    }

    let my_id = match resp_rx.await {
        Ok(id) => id,
        Err(_) => {
            tracing::error!("Failed to receive identity");
            return;
        }
    };

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(msg) => {
                                let cmd = GameCommand::Message { id: my_id.clone(), msg };
                                if app_state.game_tx.send(cmd).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!("Player {} sent malformed message: {}", my_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Player {} socket error: {}", my_id, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client
            out = outbound_rx.recv() => {
                let Some(server_msg) = out else { break };
                match serde_json::to_string(&server_msg) {
                    Ok(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize message for {}: {}", my_id, e),
                }
            }
        }
    }

    let _ = app_state
        .game_tx
        .send(GameCommand::Disconnect { id: my_id })
        .await;
}
