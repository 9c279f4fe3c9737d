//! JWT (HS256) による CredentialService 実装
//!
//! トークンはクエリパラメータ `token` で渡され、`username` クレームを持つ。
//! 有効期限はデフォルトで 24 時間。

use std::sync::Arc;

use chrono::Duration;
use hiroba_shared::time::{Clock, SystemClock};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{CredentialError, CredentialService, Username};

/// トークンのデフォルトの有効期間（時間）
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    username: String,
    /// Expiration time (Unix timestamp, seconds)
    exp: i64,
    /// Issued at (Unix timestamp, seconds)
    iat: i64,
}

/// HS256 の JWT を発行・検証する
pub struct JwtCredentialService {
    secret: String,
    validity: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtCredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredentialService")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl JwtCredentialService {
    pub fn new(secret: impl Into<String>, validity: Duration) -> Self {
        Self::with_clock(secret, validity, Arc::new(SystemClock))
    }

    /// 発行時刻の時計を差し替えて作成（テスト用）
    pub fn with_clock(secret: impl Into<String>, validity: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            validity,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl CredentialService for JwtCredentialService {
    fn issue(&self, username: &Username) -> Result<String, CredentialError> {
        if self.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }

        let now = self.clock.now_secs();
        let claims = Claims {
            username: username.as_str().to_string(),
            exp: now + self.validity.num_seconds(),
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CredentialError::SigningFailed(e.to_string()))
    }

    fn authenticate(&self, token: Option<&str>) -> Result<Username, CredentialError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(CredentialError::MissingToken)?;
        if self.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Self::validation(),
        )
        .map_err(|e| CredentialError::InvalidToken(e.to_string()))?;

        Username::new(data.claims.username)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))
    }
}
