//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{CredentialService, MessagePusher, RoomName, RoomRepository},
    infrastructure::{
        credential::JwtCredentialService, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
    usecase::{
        FanOutDispatcher, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, SendMessageUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, issue_token, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// This struct encapsulates the wired-up use cases and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(&ServerConfig::default());
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `credential_service` - Token issuance and verification
    /// * `join_room_usecase` - UseCase for joining a room
    /// * `leave_room_usecase` - UseCase for leaving a room
    /// * `send_message_usecase` - UseCase for relaying inbound frames
    /// * `get_rooms_usecase` - UseCase for getting rooms list
    /// * `get_room_detail_usecase` - UseCase for getting room detail
    /// * `default_room` - Room joined when the client does not name one
    pub fn new(
        credential_service: Arc<dyn CredentialService>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        default_room: RoomName,
    ) -> Self {
        Self {
            state: AppState {
                credential_service,
                join_room_usecase,
                leave_room_usecase,
                send_message_usecase,
                get_rooms_usecase,
                get_room_detail_usecase,
                default_room,
            },
        }
    }

    /// Wire every dependency from the configuration
    ///
    /// Dependencies are created in order:
    /// 1. Repository
    /// 2. MessagePusher
    /// 3. FanOutDispatcher
    /// 4. UseCases
    pub fn from_config(config: &ServerConfig) -> Self {
        // 1. Create Repository (in-memory registry)
        let repository: Arc<dyn RoomRepository> =
            Arc::new(InMemoryRoomRepository::new(config.max_history));

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::default());

        // 3. Create FanOutDispatcher (workers start on first broadcast)
        let dispatcher = Arc::new(FanOutDispatcher::new(
            repository.clone(),
            message_pusher.clone(),
            config.dispatch_mode,
            config.queue_capacity,
        ));

        // 4. Create UseCases
        let credential_service = Arc::new(JwtCredentialService::new(
            config.jwt_secret.clone(),
            config.token_ttl,
        ));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        ));
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        ));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            repository.clone(),
            message_pusher,
            dispatcher,
        ));
        let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
        let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository));

        Self::new(
            credential_service,
            join_room_usecase,
            leave_room_usecase,
            send_message_usecase,
            get_rooms_usecase,
            get_room_detail_usecase,
            config.default_room.clone(),
        )
    }

    /// Build the router without binding a listener
    pub fn router(self) -> Router {
        let app_state = Arc::new(self.state);

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/auth", get(issue_token))
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Hiroba relay listening on {}", listener.local_addr()?);
        tracing::info!("Get a token: http://{}/auth?username=<name>", bind_addr);
        tracing::info!("Connect to: ws://{}/ws?token=<token>&room=<room>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
