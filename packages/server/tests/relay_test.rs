//! Integration tests for the relay, running the router in-process on an ephemeral port.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{
    config::ServerConfig,
    infrastructure::dto::http::{RoomDetailDto, TokenResponseDto},
    ui::Server,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Helper struct to manage an in-process server
struct TestServer {
    addr: std::net::SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    async fn start_with(config: ServerConfig) -> Self {
        let app = Server::from_config(&config).router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        TestServer { addr, handle }
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn ws_url(&self, token: &str, room: Option<&str>) -> String {
        match room {
            Some(room) => format!("ws://{}/ws?token={}&room={}", self.addr, token, room),
            None => format!("ws://{}/ws?token={}", self.addr, token),
        }
    }

    async fn token(&self, username: &str) -> String {
        let res = reqwest::get(self.http_url(&format!("/auth?username={username}")))
            .await
            .expect("Failed to request token");
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        res.json::<TokenResponseDto>()
            .await
            .expect("Failed to decode token response")
            .token
    }

    async fn connect(&self, username: &str, room: Option<&str>) -> WsClient {
        let token = self.token(username).await;
        let (ws, _) = connect_async(self.ws_url(&token, room))
            .await
            .expect("Failed to connect");
        ws
    }

    async fn room_detail(&self, room: &str) -> Option<RoomDetailDto> {
        let res = reqwest::get(self.http_url(&format!("/api/rooms/{room}")))
            .await
            .expect("Failed to request room detail");
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return None;
        }
        Some(res.json().await.expect("Failed to decode room detail"))
    }

    /// Polls until the room has exactly `count` members.
    async fn wait_for_members(&self, room: &str, count: usize) -> RoomDetailDto {
        for _ in 0..100 {
            if let Some(detail) = self.room_detail(room).await
                && detail.members.len() == count
            {
                return detail;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("room '{room}' never reached {count} members");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn recv_text(ws: &mut WsClient) -> String {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("WebSocket error");
        if msg.is_text() {
            return msg.to_text().expect("Frame was not text").to_string();
        }
    }
}

async fn assert_silent(ws: &mut WsClient) {
    let res = tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(res.is_err(), "expected no frame, got {res:?}");
}

#[tokio::test]
async fn test_auth_issues_token() {
    // テスト項目: /auth がトークンを返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let res = reqwest::get(server.http_url("/auth?username=alice"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_without_username_is_bad_request() {
    // テスト項目: username なしの /auth は 400
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let missing = reqwest::get(server.http_url("/auth")).await.unwrap();
    let empty = reqwest::get(server.http_url("/auth?username=")).await.unwrap();

    // then (期待する結果):
    assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(missing.text().await.unwrap(), "Missing username");
    assert_eq!(empty.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_with_empty_secret_is_internal_error() {
    // テスト項目: 秘密鍵が空の場合 /auth は 500
    // given (前提条件):
    let server = TestServer::start_with(ServerConfig {
        jwt_secret: String::new(),
        ..ServerConfig::default()
    })
    .await;

    // when (操作):
    let res = reqwest::get(server.http_url("/auth?username=alice"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_websocket_rejects_invalid_token() {
    // テスト項目: 不正なトークンでは 401 が返り、セッションは作られない
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let result = connect_async(server.ws_url("not-a-token", Some("lobby"))).await;

    // then (期待する結果):
    match result {
        Err(WsError::Http(response)) => {
            assert_eq!(response.status(), 401);
        }
        Err(e) => panic!("expected HTTP 401, got {e}"),
        Ok(_) => panic!("expected HTTP 401, got an upgraded connection"),
    }
    assert!(server.room_detail("lobby").await.is_none());
}

#[tokio::test]
async fn test_websocket_rejects_missing_token() {
    // テスト項目: トークンなしでは 401
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let result = connect_async(format!("ws://{}/ws?room=lobby", server.addr)).await;

    // then (期待する結果):
    assert!(matches!(result, Err(WsError::Http(ref r)) if r.status() == 401));
}

#[tokio::test]
async fn test_broadcast_and_directed_messages_in_lobby() {
    // テスト項目: ブロードキャストとダイレクトメッセージの配送、および履歴
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice", Some("lobby")).await;
    server.wait_for_members("lobby", 1).await;
    let mut bob = server.connect("bob", Some("lobby")).await;
    server.wait_for_members("lobby", 2).await;

    // when (操作): alice がブロードキャスト
    alice.send(Message::text("hello")).await.unwrap();

    // then (期待する結果): 送信者を含む全員に届く
    assert_eq!(recv_text(&mut alice).await, "alice: hello");
    assert_eq!(recv_text(&mut bob).await, "alice: hello");

    // when (操作): bob が alice にダイレクトメッセージ
    bob.send(Message::text("@alice hi")).await.unwrap();

    // then (期待する結果): alice だけに届く
    assert_eq!(recv_text(&mut alice).await, "(Private) bob: hi");
    assert_silent(&mut bob).await;

    let detail = server.room_detail("lobby").await.unwrap();
    assert_eq!(
        detail.history,
        vec![
            "alice joined the room".to_string(),
            "bob joined the room".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_directed_message_to_unknown_user_is_dropped() {
    // テスト項目: 存在しないユーザー宛てのメッセージは破棄され、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice", Some("lobby")).await;
    server.wait_for_members("lobby", 1).await;

    // when (操作):
    alice.send(Message::text("@carol hi")).await.unwrap();
    alice.send(Message::text("@bob")).await.unwrap();
    alice.send(Message::text("still here")).await.unwrap();

    // then (期待する結果):
    assert_eq!(recv_text(&mut alice).await, "alice: still here");
    let detail = server.room_detail("lobby").await.unwrap();
    assert_eq!(detail.history, vec!["alice joined the room".to_string()]);
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    // テスト項目: 別ルームにはメッセージが届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice", Some("red")).await;
    server.wait_for_members("red", 1).await;
    let mut bob = server.connect("bob", Some("blue")).await;
    server.wait_for_members("blue", 1).await;

    // when (操作):
    alice.send(Message::text("only red")).await.unwrap();
    bob.send(Message::text("@alice psst")).await.unwrap();

    // then (期待する結果):
    assert_eq!(recv_text(&mut alice).await, "alice: only red");
    assert_silent(&mut alice).await;
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_missing_room_uses_default() {
    // テスト項目: room 未指定の場合はデフォルトルームに参加する
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let _alice = server.connect("alice", None).await;

    // then (期待する結果):
    let detail = server.wait_for_members("default", 1).await;
    assert_eq!(detail.members[0].username, "alice");
}

#[tokio::test]
async fn test_disconnect_records_leave_entry() {
    // テスト項目: 切断するとメンバーから外れ、退出が履歴に残る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice", Some("lobby")).await;
    let _bob = server.connect("bob", Some("lobby")).await;
    server.wait_for_members("lobby", 2).await;

    // when (操作):
    alice.close(None).await.unwrap();

    // then (期待する結果):
    let detail = server.wait_for_members("lobby", 1).await;
    assert_eq!(detail.members[0].username, "bob");
    assert!(detail.history.contains(&"alice left the room".to_string()));
}

#[tokio::test]
async fn test_health_and_room_list() {
    // テスト項目: ヘルスチェックとルーム一覧
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.connect("alice", Some("lobby")).await;
    server.wait_for_members("lobby", 1).await;

    // when (操作):
    let health = reqwest::get(server.http_url("/api/health")).await.unwrap();
    let rooms: serde_json::Value = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert_eq!(rooms[0]["name"], "lobby");
    assert_eq!(rooms[0]["members"][0], "alice");
    assert_eq!(rooms[0]["history_len"], 1);
}

#[tokio::test]
async fn test_username_with_space_can_connect_and_broadcast() {
    // テスト項目: 空白を含むユーザー名でもトークンを取得し、接続してブロードキャストできる
    // given (前提条件):
    let server = TestServer::start().await;
    let res = reqwest::Client::new()
        .get(server.http_url("/auth"))
        .query(&[("username", "alice smith")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let token = res.json::<TokenResponseDto>().await.unwrap().token;
    let (mut alice, _) = connect_async(server.ws_url(&token, Some("lobby")))
        .await
        .unwrap();
    let detail = server.wait_for_members("lobby", 1).await;
    assert_eq!(detail.members[0].username, "alice smith");

    // when (操作):
    alice.send(Message::text("hello")).await.unwrap();

    // then (期待する結果):
    assert_eq!(recv_text(&mut alice).await, "alice smith: hello");
}
