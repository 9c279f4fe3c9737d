//! Entity 定義
//!
//! - `Session`: 接続中のクライアント 1 つ分の状態
//! - `Room`: メンバー（接続 ID の参照）と履歴を持つ名前付きチャンネル
//! - `HistoryLog`: 上限付きの最近の履歴（FIFO で古いものから削除）

use std::collections::VecDeque;

use serde::Serialize;

use super::value_object::{ConnectionId, RoomName, Timestamp, Username};

/// ルームごとに保持する履歴の最大件数
pub const MAX_HISTORY: usize = 20;

/// 接続中のクライアントのセッション
///
/// 接続そのもの（送信チャンネル）は MessagePusher が `connection_id` をキーに保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub username: Username,
    /// 現在参加しているルーム（1 セッションにつき 1 ルーム）
    pub room: RoomName,
    pub joined_at: Timestamp,
}

impl Session {
    pub fn new(
        connection_id: ConnectionId,
        username: Username,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            username,
            room,
            joined_at,
        }
    }
}

/// 上限付きの履歴
///
/// 追加は「末尾に追加してから先頭を削る」。常に `len() <= capacity()` が成り立つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// 履歴を追加し、上限を超えた分を古い順に削除する
    pub fn push(&mut self, entry: String) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    /// 古い順のスナップショット
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

/// ルーム
///
/// `members` は参加順の接続 ID。セッション本体は Registry のセッション表が所有する。
#[derive(Debug, Clone)]
pub struct Room {
    pub name: RoomName,
    pub members: Vec<ConnectionId>,
    pub history: HistoryLog,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(name: RoomName, created_at: Timestamp, max_history: usize) -> Self {
        Self {
            name,
            members: Vec::new(),
            history: HistoryLog::with_capacity(max_history),
            created_at,
        }
    }

    pub fn add_member(&mut self, connection_id: ConnectionId) {
        if !self.members.contains(&connection_id) {
            self.members.push(connection_id);
        }
    }

    /// メンバーを削除する。存在しない場合は `false`
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| id != connection_id);
        self.members.len() != before
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains(connection_id)
    }
}

/// ルームの読み取り用スナップショット（HTTP API 向け）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub name: RoomName,
    /// 参加順のセッション
    pub members: Vec<Session>,
    /// 古い順の履歴
    pub history: Vec<String>,
    pub created_at: Timestamp,
}
