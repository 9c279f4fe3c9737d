//! WebSocket room relay server.
//!
//! Clients fetch a token from `/auth?username=<name>`, then connect to
//! `/ws?token=<token>&room=<room>`. Text frames starting with `@<user> ` are
//! delivered privately to that user in the same room; anything else is
//! broadcast to the room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --dispatch-mode shared
//! ```

use chrono::Duration;
use clap::Parser;

use hiroba_server::{
    config::{DEFAULT_JWT_SECRET, DEFAULT_QUEUE_CAPACITY, DispatchMode, ServerConfig},
    domain::{DEFAULT_ROOM, MAX_HISTORY, RoomName},
    ui::Server,
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "WebSocket room relay with broadcast and directed messages", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// Secret used to sign and verify tokens
    #[arg(long, env = "HIROBA_JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    jwt_secret: String,

    /// Validity window of issued tokens, in hours
    #[arg(long, env = "HIROBA_TOKEN_TTL_HOURS", default_value_t = 24)]
    token_ttl_hours: i64,

    /// Room joined when the client does not name one
    #[arg(long, env = "HIROBA_DEFAULT_ROOM", default_value = DEFAULT_ROOM)]
    default_room: String,

    /// Maximum number of history entries kept per room
    #[arg(long, env = "HIROBA_MAX_HISTORY", default_value_t = MAX_HISTORY)]
    max_history: usize,

    /// Capacity of each broadcast queue
    #[arg(long, env = "HIROBA_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Broadcast queue layout
    #[arg(long, env = "HIROBA_DISPATCH_MODE", value_enum, default_value_t = DispatchMode::PerRoom)]
    dispatch_mode: DispatchMode,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            jwt_secret: self.jwt_secret,
            token_ttl: Duration::hours(self.token_ttl_hours),
            default_room: RoomName::resolve(Some(&self.default_room), &defaults.default_room),
            max_history: self.max_history,
            queue_capacity: self.queue_capacity,
            dispatch_mode: self.dispatch_mode,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let host = args.host.clone();
    let port = args.port;
    let config = args.into_config();
    if config.jwt_secret.is_empty() {
        tracing::warn!("JWT secret is empty: token issuance will fail and every connection will be rejected");
    } else if config.uses_default_secret() {
        tracing::warn!("Using the built-in development JWT secret: set HIROBA_JWT_SECRET or --jwt-secret");
    }

    let server = Server::from_config(&config);
    if let Err(e) = server.run(host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
