//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::{CredentialService, RoomName},
    usecase::{
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// CredentialService（トークンの発行・検証）
    pub credential_service: Arc<dyn CredentialService>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（受信フレーム処理のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// `room` クエリパラメータが未指定の場合のルーム
    pub default_room: RoomName,
}
