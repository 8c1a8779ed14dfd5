use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::{Json, Response},
};

use crate::{
    errors::{AppError, Result},
    handlers::{files::file_response, record_id, AppState},
    middleware::auth::AuthenticatedUser,
    models::{Delivery, GenerateRequest, GenerateResponse},
    services::{generation::GenerationService, retrieval::RetrievalService},
};

pub async fn generate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let text = request.text.unwrap_or_default();

    let audio = GenerationService::new(&state).generate(user.id, &text).await?;

    Ok(Json(GenerateResponse {
        message: "Audio generated",
        audio_id: audio.id,
        file_path: audio.file_path,
    }))
}

pub async fn download_audio(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    audio_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let audio_id = record_id(audio_id, "Audio file not found")?;
    let retrieved = RetrievalService::new(&state).fetch_audio(user.id, audio_id).await?;
    file_response(retrieved, Delivery::Download)
}

pub async fn stream_audio(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    audio_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let audio_id = record_id(audio_id, "Audio file not found")?;
    let retrieved = RetrievalService::new(&state).fetch_audio(user.id, audio_id).await?;
    file_response(retrieved, Delivery::Stream)
}
