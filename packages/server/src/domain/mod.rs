//! ドメイン層
//!
//! リレーの中核となるモデル（Session, Room, HistoryLog）と、
//! ドメイン層が外部に要求するインターフェース（Repository, MessagePusher,
//! CredentialService）を定義します。

pub mod credential;
pub mod entity;
pub mod error;
pub mod frame;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use credential::CredentialService;
pub use entity::{HistoryLog, MAX_HISTORY, Room, RoomSnapshot, Session};
pub use error::{CredentialError, DomainError, MessagePushError};
pub use frame::{InboundFrame, broadcast_frame, joined_entry, left_entry, private_frame};
pub use message_pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, DEFAULT_ROOM, RoomName, Timestamp, Username};
