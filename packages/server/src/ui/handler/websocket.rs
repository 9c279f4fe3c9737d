//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, RoomName, Session, Username},
    ui::{error::ApiError, state::AppState},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
    pub room: Option<String>,
}

/// Authenticates before upgrading. No session exists unless the token is valid.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let username = state
        .credential_service
        .authenticate(query.token.as_deref())
        .map_err(|e| {
            tracing::warn!("Rejected WebSocket connection: {}", e);
            ApiError::Unauthorized
        })?;
    let room = RoomName::resolve(query.room.as_deref(), &state.default_room);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, username, room)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The task ends when every sender of the channel is dropped (the connection was
/// unregistered) or when a socket write fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.close().await;
    })
}

/// Spawns the read loop: one inbound frame at a time until error or close.
fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    session: Session,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error for '{}': {}", session.username, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Err(e) = state
                        .send_message_usecase
                        .execute(&session, text.as_str())
                        .await
                    {
                        tracing::warn!("Failed to relay message from '{}': {}", session.username, e);
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("User '{}' requested close", session.username);
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol; binary frames are ignored
                _ => {}
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, username: Username, room: RoomName) {
    let connection_id = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();

    let session = state
        .join_room_usecase
        .execute(connection_id, username, room, tx)
        .await;
    tracing::info!("User {} joined room {}", session.username, session.room);

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = read_loop(receiver, state.clone(), session.clone());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Teardown runs on every exit path. The dispatcher may already have pruned us.
    if state
        .leave_room_usecase
        .execute(&connection_id)
        .await
        .is_none()
    {
        tracing::debug!("Connection '{}' was already pruned", connection_id);
    }
    tracing::info!("User {} left room {}", session.username, session.room);
}
