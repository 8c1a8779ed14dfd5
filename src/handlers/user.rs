use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{AudioRecord, LogDownloadRequest, Usage, User},
};

pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Usage>> {
    let no_plan = || AppError::Forbidden("No plan assigned by admin".to_string());

    let account = state.repository.find_user(user.id).await?.ok_or_else(no_plan)?;
    if !account.has_plan() {
        return Err(no_plan());
    }

    let usage = state.repository.find_usage(user.id).await?.ok_or_else(no_plan)?;

    Ok(Json(usage))
}

pub async fn profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<User>> {
    let account = state
        .repository
        .find_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(account))
}

pub async fn voice_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<AudioRecord>>> {
    let audio = state.repository.list_audio_by_user(user.id).await?;
    Ok(Json(audio))
}

pub async fn log_download(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<LogDownloadRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let not_found = || AppError::NotFound("Audio not found or access denied".to_string());

    let audio_id = request.audio_id.ok_or_else(not_found)?;
    let audio = state
        .repository
        .find_audio(audio_id)
        .await?
        .filter(|audio| audio.user_id == user.id)
        .ok_or_else(not_found)?;

    tracing::info!(user_id = user.id, audio_id = audio.id, "Download logged");

    Ok(Json(json!({
        "message": "Download logged",
        "download_url": format!("/api/voice/download/{}", audio.id)
    })))
}
