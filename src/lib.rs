pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use handlers::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let voice_routes = Router::new()
        .route("/generate", post(handlers::tts::generate))
        .route("/download/:id", get(handlers::tts::download_audio))
        .route("/download-audio/:id", get(handlers::tts::download_audio))
        .route("/stream/:id", get(handlers::tts::stream_audio))
        .route("/clone-voice", post(handlers::voices::clone_voice))
        .route("/voices", get(handlers::voices::list_voices))
        .route("/voices/:id", delete(handlers::voices::delete_voice))
        .route("/voices/:id/download", get(handlers::voices::download_voice))
        .route("/languages", get(handlers::reference::languages))
        .route("/styles", get(handlers::reference::styles));

    let user_routes = Router::new()
        .route("/dashboard", get(handlers::user::dashboard))
        .route("/profile", get(handlers::user::profile))
        .route("/voice-history", get(handlers::user::voice_history))
        .route("/download-audio", post(handlers::user::log_download));

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .nest("/api/voice", voice_routes)
        .nest("/api/user", user_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
