//! UseCase: ルーム一覧・詳細の取得

use std::sync::Arc;

use crate::domain::{RoomName, RoomRepository, RoomSnapshot};

use super::error::GetRoomDetailError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 全ルームのスナップショット（ルーム名順）
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.repository.rooms().await
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_name: String) -> Result<RoomSnapshot, GetRoomDetailError> {
        let room_name =
            RoomName::new(room_name).map_err(|_| GetRoomDetailError::InvalidRoomName)?;
        self.repository
            .room(&room_name)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
