//! HTTP API の DTO

use hiroba_shared::time::timestamp_to_rfc3339;
use serde::{Deserialize, Serialize};

use crate::domain::{RoomSnapshot, Session};

/// `GET /auth` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponseDto {
    pub token: String,
}

/// `GET /api/rooms` の要素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub name: String,
    /// 参加順のユーザー名
    pub members: Vec<String>,
    pub history_len: usize,
    pub created_at: String,
}

/// `GET /api/rooms/{room}` のメンバー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetailDto {
    pub username: String,
    pub joined_at: String,
}

/// `GET /api/rooms/{room}` のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub name: String,
    pub members: Vec<MemberDetailDto>,
    /// 古い順の履歴
    pub history: Vec<String>,
    pub created_at: String,
}

impl From<RoomSnapshot> for RoomSummaryDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            name: room.name.into_string(),
            members: room
                .members
                .into_iter()
                .map(|s| s.username.into_string())
                .collect(),
            history_len: room.history.len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<Session> for MemberDetailDto {
    fn from(session: Session) -> Self {
        Self {
            username: session.username.into_string(),
            joined_at: timestamp_to_rfc3339(session.joined_at.value()),
        }
    }
}

impl From<RoomSnapshot> for RoomDetailDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            name: room.name.into_string(),
            members: room.members.into_iter().map(Into::into).collect(),
            history: room.history,
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, RoomName, Timestamp, Username};

    fn create_snapshot() -> RoomSnapshot {
        let lobby = RoomName::new("lobby".to_string()).unwrap();
        RoomSnapshot {
            name: lobby.clone(),
            members: vec![Session::new(
                ConnectionId::generate(),
                Username::new("alice".to_string()).unwrap(),
                lobby,
                Timestamp::new(1672531200000),
            )],
            history: vec!["alice joined the room".to_string()],
            created_at: Timestamp::new(1672531200000),
        }
    }

    #[test]
    fn test_room_summary_from_snapshot() {
        // テスト項目: スナップショットからルーム概要 DTO に変換される
        // given (前提条件):
        let snapshot = create_snapshot();

        // when (操作):
        let dto: RoomSummaryDto = snapshot.into();

        // then (期待する結果):
        assert_eq!(dto.name, "lobby");
        assert_eq!(dto.members, vec!["alice"]);
        assert_eq!(dto.history_len, 1);
        assert!(dto.created_at.starts_with("2023-01-01T00:00:00"));
    }

    #[test]
    fn test_room_detail_from_snapshot() {
        // テスト項目: スナップショットからルーム詳細 DTO に変換され、履歴がそのまま含まれる
        // given (前提条件):
        let snapshot = create_snapshot();

        // when (操作):
        let dto: RoomDetailDto = snapshot.into();

        // then (期待する結果):
        assert_eq!(dto.members.len(), 1);
        assert_eq!(dto.members[0].username, "alice");
        assert_eq!(dto.history, vec!["alice joined the room"]);
    }
}
