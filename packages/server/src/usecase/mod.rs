//! UseCase 層
//!
//! UI 層（WebSocket / HTTP ハンドラ）から呼ばれるアプリケーションロジック。
//! ドメイン層の trait（RoomRepository, MessagePusher）にのみ依存します。

pub mod error;
pub mod fan_out;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod send_message;

pub use error::{DispatchError, GetRoomDetailError, SendMessageError};
pub use fan_out::{BroadcastMessage, DeliveryReport, FanOutDispatcher};
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::{DropReason, SendMessageUseCase, SendOutcome};
