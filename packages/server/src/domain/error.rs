//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成時に発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// ユーザー名が空
    #[error("username must not be empty")]
    EmptyUsername,

    /// ルーム名が空
    #[error("room name must not be empty")]
    EmptyRoomName,
}

/// 資格情報（トークン）の発行・検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// リクエストにトークンが含まれていない
    #[error("token is missing")]
    MissingToken,

    /// トークンが不正（形式不正、署名不一致、期限切れ）
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// 署名鍵が設定されていない
    #[error("secret key is missing")]
    MissingSecret,

    /// トークンの署名に失敗
    #[error("failed to sign token: {0}")]
    SigningFailed(String),
}

/// メッセージ送信時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先の接続が登録されていない
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    /// 送信先の接続が閉じている
    #[error("push failed: {0}")]
    PushFailed(String),
}
