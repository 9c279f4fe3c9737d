//! WebSocket relay server: HTTP routing and connection handling.

mod error;
mod handler;
mod server;
mod signal;
pub mod state; // UseCase 層の組み立てに使うため public

pub use error::ApiError;
pub use server::Server;
