//! Fan-out Dispatcher
//!
//! 投入されたブロードキャストを、対象ルームの現在のメンバー全員に配信します。
//!
//! - 対象ルームは投入時に確定し（`BroadcastMessage::room`）、配信時点のメンバーに送る
//! - メンバーのスナップショットは Registry のロック内で取得し、送信はロックの外で行う
//! - 送信に失敗した接続は切断済みとみなし、チャンネルを破棄して Registry から取り除く
//!   （読み取りループ側の退出処理と競合しても冪等）
//! - 再送はしない
//!
//! キューの配置は `DispatchMode` で選ぶ。`PerRoom` ではルームごとにキューとワーカーを
//! 最初の投入時に作成し、`Shared` では全ルームで 1 つのキューを共有する。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};

use crate::{
    config::DispatchMode,
    domain::{ConnectionId, MessagePusher, RoomName, RoomRepository},
};

use super::error::DispatchError;

/// 配信待ちのブロードキャスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    /// 投入時点の送信者のルーム
    pub room: RoomName,
    /// 送信フレーム（`<sender>: <text>`）
    pub content: String,
}

/// 1 件のブロードキャストの配信結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// 送信に失敗し、取り除かれた接続
    pub pruned: Vec<ConnectionId>,
}

/// キューのキー。`Shared` モードでは全ルームが `None` を共有する
type QueueKey = Option<RoomName>;

/// ブロードキャストの配信を担当する
///
/// `PerRoom` モードのキューとワーカーは、一度ブロードキャストのあったルームごとに
/// プロセス終了まで残る（ルーム自体も削除されないため）。待機中のワーカーは
/// キューの受信を待つだけで、CPU は消費しない。ルーム名の種類が際限なく増える
/// 環境では `Shared` モードを使う。
pub struct FanOutDispatcher {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    mode: DispatchMode,
    queue_capacity: usize,
    queues: Mutex<HashMap<QueueKey, mpsc::Sender<BroadcastMessage>>>,
}

impl FanOutDispatcher {
    /// 新しい FanOutDispatcher を作成
    ///
    /// ワーカーは最初の `submit` で起動するため、tokio ランタイムの外で作成してよい。
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        mode: DispatchMode,
        queue_capacity: usize,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            mode,
            queue_capacity: queue_capacity.max(1),
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// ブロードキャストをキューに投入する
    ///
    /// キューが満杯の間は待機する。
    pub async fn submit(&self, message: BroadcastMessage) -> Result<(), DispatchError> {
        let queue = self.queue_for(&message.room).await;
        queue
            .send(message)
            .await
            .map_err(|_| DispatchError::QueueClosed)
    }

    /// 起動済みのキューの数
    pub async fn queue_count(&self) -> usize {
        self.queues.lock().await.len()
    }

    async fn queue_for(&self, room: &RoomName) -> mpsc::Sender<BroadcastMessage> {
        let key = match self.mode {
            DispatchMode::PerRoom => Some(room.clone()),
            DispatchMode::Shared => None,
        };

        let mut queues = self.queues.lock().await;
        if let Some(queue) = queues.get(&key)
            && !queue.is_closed()
        {
            return queue.clone();
        }

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        tokio::spawn(run_worker(
            rx,
            self.repository.clone(),
            self.message_pusher.clone(),
            key.clone(),
        ));
        tracing::debug!(
            "Started broadcast worker for {}",
            key.as_ref().map_or("all rooms", RoomName::as_str)
        );
        queues.insert(key, tx.clone());
        tx
    }
}

/// キューを順番に消費し、1 件ずつ配信する
async fn run_worker(
    mut rx: mpsc::Receiver<BroadcastMessage>,
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    key: QueueKey,
) {
    while let Some(message) = rx.recv().await {
        deliver(repository.as_ref(), message_pusher.as_ref(), &message).await;
    }
    tracing::debug!(
        "Broadcast worker for {} stopped",
        key.as_ref().map_or("all rooms", RoomName::as_str)
    );
}

/// ルームのメンバー全員にメッセージを送信し、送信に失敗した接続を取り除く
pub async fn deliver(
    repository: &dyn RoomRepository,
    message_pusher: &dyn MessagePusher,
    message: &BroadcastMessage,
) -> DeliveryReport {
    // スナップショット取得後は Registry のロックを保持しない
    let members = repository.members(&message.room).await;

    let mut report = DeliveryReport::default();
    for member in members {
        match message_pusher
            .push_to(&member.connection_id, &message.content)
            .await
        {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to deliver to '{}' in room '{}': {}. Closing connection",
                    member.username,
                    message.room,
                    e
                );
                message_pusher
                    .unregister_client(&member.connection_id)
                    .await;
                if repository.leave(&member.connection_id).await.is_some() {
                    tracing::info!(
                        "User {} pruned from room {}",
                        member.username,
                        message.room
                    );
                }
                report.pruned.push(member.connection_id);
            }
        }
    }
    report
}
