//! Data Transfer Objects
//!
//! HTTP API のレスポンス型と、ドメインモデルからの変換を定義します。
//! WebSocket 上のフレームはプレーンテキストのため DTO を持ちません。

pub mod http;
