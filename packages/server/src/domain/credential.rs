//! 資格情報（トークン）サービスの trait 定義

use super::{CredentialError, Username};

/// トークンの発行と検証
///
/// 共有の可変状態を持たない純粋な関数の集まり。
pub trait CredentialService: Send + Sync {
    /// ユーザー名に対して有効期限付きの署名済みトークンを発行
    fn issue(&self, username: &Username) -> Result<String, CredentialError>;

    /// トークンを検証し、ユーザー名を取り出す
    ///
    /// トークンが未指定・不正・期限切れ・別の鍵で署名されている場合はエラー。
    fn authenticate(&self, token: Option<&str>) -> Result<Username, CredentialError>;
}
