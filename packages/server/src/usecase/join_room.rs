//! UseCase: ルーム参加処理
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 送信チャンネルの登録と Registry への参加が両方行われること
//!
//! ### どのような状況を想定しているか
//! - 正常系：新しいルームへの参加、既存ルームへの参加
//! - エッジケース：同じユーザー名のセッションが複数参加する

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, PusherChannel, RoomName, RoomRepository, Session, Username,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ルーム参加を実行
    ///
    /// 参加直後に届くブロードキャストを取りこぼさないよう、
    /// 送信チャンネルを先に登録してから Registry に参加させる。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 接続 ID
    /// * `username` - 認証済みのユーザー名
    /// * `room` - 参加するルーム
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        username: Username,
        room: RoomName,
        sender: PusherChannel,
    ) -> Session {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        self.repository.join(connection_id, username, room).await
    }
}
