use axum::{
    extract::{
        multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, Query, State,
    },
    response::{Json, Response},
};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    handlers::{files::file_response, record_id, AppState},
    middleware::auth::AuthenticatedUser,
    models::{Delivery, VoiceSearchQuery, VoiceSummary},
    services::{retrieval::RetrievalService, voices::VoiceService},
};

pub async fn clone_voice(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut voice_file: Option<Vec<u8>> = None;
    let mut voice_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::Validation(format!("Failed to parse multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "voice_file" => {
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read voice file: {}", e))
                })?;
                voice_file = Some(data.to_vec());
            }
            "voice_name" => {
                voice_name = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read voice name: {}", e))
                })?);
            }
            _ => {} // Ignore unknown fields
        }
    }

    let voice = VoiceService::new(&state)
        .clone_voice(user.id, voice_name, voice_file)
        .await?;

    Ok(Json(json!({
        "message": "Voice cloned successfully",
        "voice_id": voice.id
    })))
}

pub async fn list_voices(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<VoiceSearchQuery>,
) -> Result<Json<Vec<VoiceSummary>>> {
    let voices = VoiceService::new(&state)
        .list_voices(user.id, &query.search)
        .await?;

    Ok(Json(voices.into_iter().map(VoiceSummary::from).collect()))
}

pub async fn download_voice(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    voice_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let voice_id = record_id(voice_id, "Voice not found")?;
    let retrieved = RetrievalService::new(&state).fetch_voice(user.id, voice_id).await?;
    file_response(retrieved, Delivery::Download)
}

pub async fn delete_voice(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    voice_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>> {
    let voice_id = record_id(voice_id, "Voice not found")?;
    VoiceService::new(&state).delete_voice(user.id, voice_id).await?;

    Ok(Json(json!({
        "message": "Voice deleted successfully"
    })))
}
