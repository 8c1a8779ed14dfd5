use axum::response::Json;

use crate::{
    middleware::auth::AuthenticatedUser,
    models::{Language, VoiceStyle, LANGUAGES, STYLES},
};

pub async fn languages(_user: AuthenticatedUser) -> Json<&'static [Language]> {
    Json(LANGUAGES)
}

pub async fn styles(_user: AuthenticatedUser) -> Json<&'static [VoiceStyle]> {
    Json(STYLES)
}
