//! UseCase: 受信フレームの処理
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - フレームの分類（宛先指定 / ブロードキャスト / 不正）と、それぞれの配信先
//!
//! ### どのような状況を想定しているか
//! - 正常系：ブロードキャスト、同じルームのユーザーへの宛先指定
//! - エッジケース：空のブロードキャスト、本文のない宛先指定、別ルームのユーザー宛て

use std::sync::Arc;

use crate::domain::{
    ConnectionId, InboundFrame, MessagePusher, RoomRepository, Session, Username,
    broadcast_frame, private_frame,
};

use super::{
    error::SendMessageError,
    fan_out::{BroadcastMessage, FanOutDispatcher},
};

/// フレームを破棄した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// `@` で始まるが本文がない
    MalformedDirective,
    /// 送信者のルームに宛先のユーザーがいない
    UnknownTarget,
    /// 宛先の接続が既に閉じている
    TargetUnreachable,
}

/// フレーム処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 配信キューに投入した
    Broadcast,
    /// 宛先の接続に直接送信した
    Directed { to: ConnectionId },
    /// 黙って破棄した（送信者には通知しない）
    Dropped(DropReason),
}

/// 受信フレーム処理のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    dispatcher: Arc<FanOutDispatcher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        dispatcher: Arc<FanOutDispatcher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            dispatcher,
        }
    }

    /// 受信フレームを処理する
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者のセッション（ルームは参加時に確定している）
    /// * `text` - 受信したテキストフレーム
    ///
    /// # Returns
    ///
    /// * `Ok(SendOutcome)` - 処理結果（破棄も正常系）
    /// * `Err(SendMessageError)` - 配信キューが閉じている
    pub async fn execute(
        &self,
        sender: &Session,
        text: &str,
    ) -> Result<SendOutcome, SendMessageError> {
        match InboundFrame::parse(text) {
            InboundFrame::Malformed => {
                tracing::debug!("Dropped malformed directive from '{}'", sender.username);
                Ok(SendOutcome::Dropped(DropReason::MalformedDirective))
            }
            InboundFrame::Directed { target, body } => {
                Ok(self.send_directed(sender, target, body).await)
            }
            InboundFrame::Broadcast(text) => {
                let message = BroadcastMessage {
                    room: sender.room.clone(),
                    content: broadcast_frame(&sender.username, text),
                };
                self.dispatcher.submit(message).await?;
                Ok(SendOutcome::Broadcast)
            }
        }
    }

    async fn send_directed(&self, sender: &Session, target: &str, body: &str) -> SendOutcome {
        // 空の宛先（`@ body`）は誰にも一致しない
        let Ok(target) = Username::new(target.to_string()) else {
            return SendOutcome::Dropped(DropReason::UnknownTarget);
        };

        let Some(recipient) = self
            .repository
            .find_by_username(&sender.room, &target)
            .await
        else {
            tracing::debug!(
                "No user '{}' in room '{}', dropping directed message from '{}'",
                target,
                sender.room,
                sender.username
            );
            return SendOutcome::Dropped(DropReason::UnknownTarget);
        };

        let frame = private_frame(&sender.username, body);
        match self
            .message_pusher
            .push_to(&recipient.connection_id, &frame)
            .await
        {
            Ok(()) => SendOutcome::Directed {
                to: recipient.connection_id,
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to deliver directed message to '{}': {}",
                    recipient.username,
                    e
                );
                SendOutcome::Dropped(DropReason::TargetUnreachable)
            }
        }
    }
}
