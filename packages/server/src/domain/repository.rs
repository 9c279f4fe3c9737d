//! Repository trait 定義
//!
//! ドメイン層が必要とするルーム・セッション管理のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 全ての操作は単一の排他ロックの下で行われ、途中の状態が観測されることはありません。
//! 操作は失敗しません（存在しない接続の `leave` は `None` を返すだけ）。

use async_trait::async_trait;

use super::{ConnectionId, RoomName, RoomSnapshot, Session, Username};

/// Room Repository trait
///
/// ルーム名 → ルーム（メンバー、履歴）と、接続 ID → セッションの対応を一元管理する。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// セッションをルームに参加させ、`"<username> joined the room"` を履歴に追加する
    ///
    /// ルームが存在しなければ作成する。
    async fn join(&self, connection_id: ConnectionId, username: Username, room: RoomName)
    -> Session;

    /// セッションをルームとセッション表から削除し、`"<username> left the room"` を履歴に追加する
    ///
    /// 既に削除済みの場合は何もせず `None` を返す（切断処理と配信時の刈り取りが競合しうるため）。
    async fn leave(&self, connection_id: &ConnectionId) -> Option<Session>;

    /// ルームのメンバー（参加順）のスナップショット。存在しないルームは空
    async fn members(&self, room: &RoomName) -> Vec<Session>;

    /// ルーム内で最初に見つかった同名のセッション
    async fn find_by_username(&self, room: &RoomName, username: &Username) -> Option<Session>;

    /// ルームの履歴（古い順）。存在しないルームは空
    async fn history(&self, room: &RoomName) -> Vec<String>;

    /// 接続 ID からセッションを取得
    async fn session(&self, connection_id: &ConnectionId) -> Option<Session>;

    /// 全ルームのスナップショット（ルーム名順）
    async fn rooms(&self) -> Vec<RoomSnapshot>;

    /// 単一ルームのスナップショット
    async fn room(&self, room: &RoomName) -> Option<RoomSnapshot>;
}
