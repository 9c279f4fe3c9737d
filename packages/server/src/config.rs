//! Server configuration.

use chrono::Duration;
use clap::ValueEnum;

use crate::{
    domain::{MAX_HISTORY, RoomName},
    infrastructure::credential::jwt::DEFAULT_TOKEN_TTL_HOURS,
};

/// Signing secret used when none is configured. Only suitable for local development.
pub const DEFAULT_JWT_SECRET: &str = "supersecretkey";

/// Default capacity of each broadcast ingestion queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// How broadcast ingestion queues are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DispatchMode {
    /// One queue and worker per room. Rooms never wait on each other's backlog.
    #[default]
    PerRoom,
    /// A single queue and worker for every room (global FIFO across rooms).
    Shared,
}

/// Runtime configuration of the relay server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret used to sign and verify HS256 tokens
    pub jwt_secret: String,
    /// Validity window of issued tokens
    pub token_ttl: Duration,
    /// Room joined when the client does not name one
    pub default_room: RoomName,
    /// Maximum number of history entries kept per room
    pub max_history: usize,
    /// Capacity of each broadcast ingestion queue
    pub queue_capacity: usize,
    pub dispatch_mode: DispatchMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            default_room: RoomName::default(),
            max_history: MAX_HISTORY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            dispatch_mode: DispatchMode::default(),
        }
    }
}

impl ServerConfig {
    /// Whether tokens are signed with the built-in development secret
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
