//! UseCase: ルーム退出処理
//!
//! 読み取りループの終了時に必ず呼ばれる。配信時の刈り取りで既に削除されている
//! 場合もあるため、2 回目以降の呼び出しは何もしない。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomRepository, Session};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ルーム退出を実行
    ///
    /// # Returns
    ///
    /// * `Some(Session)` - 退出したセッション
    /// * `None` - 既に退出済み
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Session> {
        let session = self.repository.leave(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;
        session
    }
}
