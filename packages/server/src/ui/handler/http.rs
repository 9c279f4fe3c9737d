//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    domain::{CredentialError, Username},
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto, TokenResponseDto},
    ui::{error::ApiError, state::AppState},
    usecase::GetRoomDetailError,
};

/// Query parameters for token issuance
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub username: Option<String>,
}

/// Issue a signed token for `?username=`
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponseDto>, ApiError> {
    let username = query
        .username
        .and_then(|name| Username::new(name).ok())
        .ok_or_else(|| ApiError::BadRequest("Missing username".to_string()))?;

    match state.credential_service.issue(&username) {
        Ok(token) => {
            tracing::debug!("Issued token for '{}'", username);
            Ok(Json(TokenResponseDto { token }))
        }
        Err(e @ (CredentialError::MissingSecret | CredentialError::SigningFailed(_))) => {
            tracing::error!("Failed to generate token: {}", e);
            Err(ApiError::Internal(format!("Failed to generate token: {e}")))
        }
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(Into::into).collect())
}

/// Get room detail (members and history) by name
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    match state.get_room_detail_usecase.execute(room.clone()).await {
        Ok(snapshot) => Ok(Json(snapshot.into())),
        Err(GetRoomDetailError::RoomNotFound) => {
            Err(ApiError::NotFound(format!("Room '{room}' not found")))
        }
        Err(GetRoomDetailError::InvalidRoomName) => {
            Err(ApiError::BadRequest("Invalid room name".to_string()))
        }
    }
}
