//! 資格情報サービスの実装

pub mod jwt;

pub use jwt::JwtCredentialService;
