//! UseCase 層のエラー型

use thiserror::Error;

/// 配信キューへの投入エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// 配信ワーカーが停止している（シャットダウン中）
    #[error("broadcast queue is closed")]
    QueueClosed,
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("failed to submit broadcast: {0}")]
    DispatcherClosed(#[from] DispatchError),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,

    #[error("invalid room name")]
    InvalidRoomName,
}
