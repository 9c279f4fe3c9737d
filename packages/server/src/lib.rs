//! Hiroba: a WebSocket room relay.
//!
//! Authenticated clients join a named room and exchange broadcast or directed
//! messages. Each room keeps a bounded recent-history log.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
