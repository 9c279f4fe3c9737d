//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! ルーム表とセッション表を 1 つの `Mutex` で保護し、join / leave / スナップショットを
//! 直列化します。ロックはネットワーク I/O をまたいで保持しません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, MAX_HISTORY, Room, RoomName, RoomRepository, RoomSnapshot, Session, Timestamp,
    Username, joined_entry, left_entry,
};

/// ロックで保護される Registry の状態
#[derive(Debug, Default)]
struct RegistryState {
    /// ルーム名 → ルーム
    rooms: HashMap<RoomName, Room>,
    /// 接続 ID → セッション
    sessions: HashMap<ConnectionId, Session>,
}

impl RegistryState {
    fn remove_session(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(connection_id)?;
        if let Some(room) = self.rooms.get_mut(&session.room) {
            room.remove_member(connection_id);
            room.history.push(left_entry(&session.username));
        }
        Some(session)
    }

    fn snapshot(&self, room: &Room) -> RoomSnapshot {
        RoomSnapshot {
            name: room.name.clone(),
            members: self.member_sessions(room),
            history: room.history.to_vec(),
            created_at: room.created_at,
        }
    }

    fn member_sessions(&self, room: &Room) -> Vec<Session> {
        room.members
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .cloned()
            .collect()
    }
}

/// インメモリ Room Repository 実装
///
/// プロセスの生存期間中のみ状態を保持する。ルームは最初の join で作成され、削除されない。
pub struct InMemoryRoomRepository {
    state: Mutex<RegistryState>,
    /// ルームごとの履歴の上限
    max_history: usize,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(max_history: usize) -> Self {
        Self::with_clock(max_history, Arc::new(SystemClock))
    }

    /// 時計を差し替えて作成（テスト用）
    pub fn with_clock(max_history: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            max_history,
            clock,
        }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(
        &self,
        connection_id: ConnectionId,
        username: Username,
        room: RoomName,
    ) -> Session {
        let now = Timestamp::new(self.clock.now_millis());
        let mut state = self.state.lock().await;

        // 1 セッション 1 ルーム: 既に参加中なら元のルームから退出させる
        if state.remove_session(&connection_id).is_some() {
            tracing::debug!("Connection '{}' moved out of its previous room", connection_id);
        }

        let max_history = self.max_history;
        let entry = state
            .rooms
            .entry(room.clone())
            .or_insert_with(|| Room::new(room.clone(), now, max_history));
        entry.add_member(connection_id);
        entry.history.push(joined_entry(&username));

        let session = Session::new(connection_id, username, room, now);
        state.sessions.insert(connection_id, session.clone());
        session
    }

    async fn leave(&self, connection_id: &ConnectionId) -> Option<Session> {
        let mut state = self.state.lock().await;
        state.remove_session(connection_id)
    }

    async fn members(&self, room: &RoomName) -> Vec<Session> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room)
            .map(|room| state.member_sessions(room))
            .unwrap_or_default()
    }

    async fn find_by_username(&self, room: &RoomName, username: &Username) -> Option<Session> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room)?
            .members
            .iter()
            .filter_map(|id| state.sessions.get(id))
            .find(|session| &session.username == username)
            .cloned()
    }

    async fn history(&self, room: &RoomName) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room)
            .map(|room| room.history.to_vec())
            .unwrap_or_default()
    }

    async fn session(&self, connection_id: &ConnectionId) -> Option<Session> {
        let state = self.state.lock().await;
        state.sessions.get(connection_id).cloned()
    }

    async fn rooms(&self) -> Vec<RoomSnapshot> {
        let state = self.state.lock().await;
        let mut snapshots: Vec<RoomSnapshot> =
            state.rooms.values().map(|room| state.snapshot(room)).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    async fn room(&self, room: &RoomName) -> Option<RoomSnapshot> {
        let state = self.state.lock().await;
        state.rooms.get(room).map(|room| state.snapshot(room))
    }
}
