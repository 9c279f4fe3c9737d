//! MessagePusher trait 定義
//!
//! 接続へのテキストフレーム送信を抽象化します。
//! 全てのコンポーネントはこの trait 経由でのみ接続に書き込みます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 接続ごとの送信チャンネル
///
/// 受信側は UI 層の送信ループが保持し、WebSocket に書き出す。
/// 送信側が全て破棄されると送信ループが終了し、接続が閉じる。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除（破棄すると接続が閉じる）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
